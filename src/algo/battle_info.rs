//! Structured battle info decoded from a char-grid snapshot.

use crate::game::{BoardView, PlayerId, Point, CH_MINE, CH_SELF, CH_SHELL, CH_WALL};

/// Everything an algorithm learns from one `GetBattleInfo` request.
///
/// A fully detached copy of the board at the moment of the request. Shell
/// directions are not observable from a snapshot; algorithms that need them
/// must infer movement across consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleInfo {
    /// Board rows.
    pub rows: usize,
    /// Board columns.
    pub cols: usize,
    /// The player this info was prepared for.
    pub player: PlayerId,
    /// Initial shells per tank on this map.
    pub num_shells: u32,
    /// Position of the requesting tank (the `'%'` cell).
    pub my_pos: Option<Point>,
    /// Wall cells.
    pub walls: Vec<Point>,
    /// Mine cells.
    pub mines: Vec<Point>,
    /// Shell cells.
    pub shells: Vec<Point>,
    /// Friendly tanks, excluding the requester.
    pub allies: Vec<Point>,
    /// Enemy tanks.
    pub enemies: Vec<Point>,
}

impl BattleInfo {
    /// Decode a snapshot from `player`'s point of view.
    #[must_use]
    pub fn decode(view: &BoardView, player: PlayerId, num_shells: u32) -> Self {
        let mut info = Self {
            rows: view.rows(),
            cols: view.cols(),
            player,
            num_shells,
            my_pos: None,
            walls: Vec::new(),
            mines: Vec::new(),
            shells: Vec::new(),
            allies: Vec::new(),
            enemies: Vec::new(),
        };
        let own_digit = if player == 1 { '1' } else { '2' };

        for x in 0..view.rows() {
            for y in 0..view.cols() {
                let pos = Point::new(x as i32, y as i32);
                let ch = view.cell(x, y);
                if ch == CH_WALL {
                    info.walls.push(pos);
                } else if ch == CH_MINE {
                    info.mines.push(pos);
                } else if ch == CH_SHELL {
                    info.shells.push(pos);
                } else if ch == CH_SELF {
                    info.my_pos = Some(pos);
                } else if ch == own_digit {
                    info.allies.push(pos);
                } else if ch == '1' || ch == '2' {
                    info.enemies.push(pos);
                }
            }
        }
        info
    }

    /// Whether `pos` holds a wall or a mine - a cell a tank cannot use.
    #[must_use]
    pub fn is_blocked(&self, pos: Point) -> bool {
        self.walls.contains(&pos) || self.mines.contains(&pos)
    }

    /// Whether `pos` holds a wall.
    #[must_use]
    pub fn is_wall(&self, pos: Point) -> bool {
        self.walls.contains(&pos)
    }

    /// Distance from `pos` to the nearest shell, or `None` with no shells
    /// on the board.
    #[must_use]
    pub fn nearest_shell_distance(&self, pos: Point) -> Option<f64> {
        self.shells
            .iter()
            .map(|shell| pos.toroidal_distance(*shell, self.rows, self.cols))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// The enemy tank closest to `pos`, by toroidal Euclidean distance.
    #[must_use]
    pub fn closest_enemy(&self, pos: Point) -> Option<Point> {
        self.enemies
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = pos.toroidal_distance(*a, self.rows, self.cols);
                let db = pos.toroidal_distance(*b, self.rows, self.cols);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_from(rows: &[&str]) -> BoardView {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        BoardView::from_grid(&grid)
    }

    #[test]
    fn test_decode_classifies_cells() {
        let view = view_from(&["%#@  ", "1 2 *"]);
        let info = BattleInfo::decode(&view, 1, 3);
        assert_eq!(info.my_pos, Some(Point::new(0, 0)));
        assert_eq!(info.walls, vec![Point::new(0, 1)]);
        assert_eq!(info.mines, vec![Point::new(0, 2)]);
        assert_eq!(info.allies, vec![Point::new(1, 0)]);
        assert_eq!(info.enemies, vec![Point::new(1, 2)]);
        assert_eq!(info.shells, vec![Point::new(1, 4)]);
    }

    #[test]
    fn test_decode_enemy_perspective_flips() {
        let view = view_from(&["%   2", "1    "]);
        let info = BattleInfo::decode(&view, 2, 3);
        assert_eq!(info.allies, vec![Point::new(0, 4)]);
        assert_eq!(info.enemies, vec![Point::new(1, 0)]);
    }

    #[test]
    fn test_closest_enemy_uses_torus() {
        let view = view_from(&["%   2", "  1  "]);
        let info = BattleInfo::decode(&view, 2, 3);
        // Across the seam, (0, 4) is one step from (0, 0).
        assert_eq!(info.closest_enemy(Point::new(0, 0)), Some(Point::new(1, 2)));
        let d = Point::new(0, 0).toroidal_distance(Point::new(0, 4), 2, 5);
        assert!((d - 1.0).abs() < 1e-9);
    }
}
