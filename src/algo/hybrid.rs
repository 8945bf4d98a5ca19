//! The reference hybrid algorithm: shell avoidance plus BFS chase.
//!
//! Between snapshots the algorithm mirrors the engine's transitions onto a
//! private model of its own tank (position, facing, ammo, cooldown,
//! backward phase), since none of those are observable from a snapshot.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::algo::{BattleInfo, TankAlgorithm};
use crate::game::{Action, Direction, PlayerId, Point, ALL_DIRECTIONS, SHOOT_COOLDOWN};

/// Cells scanned along the cannon axis when checking for a shot.
const SHOOTING_RANGE: i32 = 3;

/// The single cheapest rotation that turns `current` toward `target`, or
/// `None` when already aligned. Ties on the half-turn go clockwise.
pub(crate) fn rotation_toward(current: Direction, target: Direction) -> Option<Action> {
    let diff = (target.index() - current.index()).rem_euclid(8);
    match diff {
        0 => None,
        1 => Some(Action::RotateRight45),
        2..=4 => Some(Action::RotateRight90),
        5 | 6 => Some(Action::RotateLeft90),
        _ => Some(Action::RotateLeft45),
    }
}

/// The algorithm's model of its own tank.
#[derive(Debug, Clone, Copy)]
struct OwnState {
    pos: Point,
    dir: Direction,
    ammo: u32,
    cooldown: u8,
    backward_phase: u8,
}

impl OwnState {
    const fn can_shoot(&self) -> bool {
        self.ammo > 0 && self.cooldown == 0
    }
}

/// Hybrid chase/avoid algorithm.
pub struct HybridAlgorithm {
    player: PlayerId,
    tank_index: u32,
    /// Path horizon and recalculation interval, in ticks.
    recalc_interval: u32,
    /// A shell within this Euclidean distance switches the tank to evasion.
    threat_radius: f64,
    /// Snapshot refresh interval, in ticks.
    info_interval: u32,
    step: u32,
    info: Option<BattleInfo>,
    me: Option<OwnState>,
    path: Vec<Point>,
}

impl HybridAlgorithm {
    /// Create the algorithm for one tank with the given tuning.
    #[must_use]
    pub fn new(
        player: PlayerId,
        tank_index: u32,
        recalc_interval: u32,
        threat_radius: f64,
        info_interval: u32,
    ) -> Self {
        Self {
            player,
            tank_index,
            recalc_interval: recalc_interval.max(1),
            threat_radius,
            info_interval: info_interval.max(1),
            step: 1,
            info: None,
            me: None,
            path: Vec::new(),
        }
    }

    fn choose(&mut self) -> Action {
        if self.info.is_none() {
            return Action::GetBattleInfo;
        }
        let Some(me) = self.me else {
            return Action::DoNothing;
        };
        if self.step % self.info_interval == 0 {
            return Action::GetBattleInfo;
        }
        if self.shell_close(me.pos) {
            self.next_avoid_action(me)
        } else {
            self.next_chase_action(me)
        }
    }

    /// Mirror the chosen action onto the private model, the same transitions
    /// the engine applies.
    fn apply(&mut self, action: Action) {
        if let Some(me) = &mut self.me {
            let (rows, cols) = self
                .info
                .as_ref()
                .map_or((1, 1), |info| (info.rows, info.cols));
            let mut shot = false;
            match action {
                Action::Shoot => {
                    me.ammo = me.ammo.saturating_sub(1);
                    me.cooldown = SHOOT_COOLDOWN;
                    shot = true;
                    let muzzle = me.pos.step(me.dir, 1, rows, cols);
                    if let Some(info) = &mut self.info {
                        info.shells.push(muzzle);
                    }
                }
                Action::MoveForward => {
                    if me.backward_phase > 0 {
                        me.backward_phase = 0;
                    } else {
                        me.pos = me.pos.step(me.dir, 1, rows, cols);
                    }
                }
                Action::MoveBackward => {
                    if me.backward_phase < 3 {
                        me.backward_phase += 1;
                    } else {
                        me.pos = me.pos.step(me.dir, -1, rows, cols);
                        me.backward_phase = 0;
                    }
                }
                Action::RotateLeft45 => me.dir = me.dir.rotated_left(1),
                Action::RotateLeft90 => me.dir = me.dir.rotated_left(2),
                Action::RotateRight45 => me.dir = me.dir.rotated_right(1),
                Action::RotateRight90 => me.dir = me.dir.rotated_right(2),
                Action::GetBattleInfo => {
                    if me.backward_phase > 0 {
                        me.backward_phase = 0;
                    }
                }
                Action::DoNothing => {}
            }
            if !shot && me.cooldown > 0 {
                me.cooldown -= 1;
            }
        }
        self.step += 1;
    }

    fn shell_close(&self, pos: Point) -> bool {
        let Some(info) = &self.info else {
            return false;
        };
        info.nearest_shell_distance(pos)
            .is_some_and(|d| d <= self.threat_radius)
    }

    /// Evasion: rotate toward, then walk, the escape direction that
    /// maximizes the minimum distance to any shell.
    fn next_avoid_action(&self, me: OwnState) -> Action {
        let escape = self.best_escape_direction(me);
        if me.dir != escape {
            if let Some(rotation) = rotation_toward(me.dir, escape) {
                return rotation;
            }
        }
        let Some(info) = &self.info else {
            return Action::DoNothing;
        };
        let forward = me.pos.step(me.dir, 1, info.rows, info.cols);
        let target = me.pos.step(escape, 1, info.rows, info.cols);
        if forward == target {
            Action::MoveForward
        } else {
            Action::MoveBackward
        }
    }

    fn best_escape_direction(&self, me: OwnState) -> Direction {
        let Some(info) = &self.info else {
            return me.dir;
        };
        let candidates: Vec<Direction> = ALL_DIRECTIONS
            .into_iter()
            .filter(|dir| {
                let next = me.pos.step(*dir, 1, info.rows, info.cols);
                !info.is_blocked(next) && !self.shell_close(next)
            })
            .collect();

        if candidates.is_empty() {
            // Nowhere safe; take the reachable cell with the fewest shells
            // within one shell-move of it.
            let mut best = me.dir;
            let mut fewest = usize::MAX;
            for dir in ALL_DIRECTIONS {
                let next = me.pos.step(dir, 1, info.rows, info.cols);
                if info.is_blocked(next) {
                    continue;
                }
                let count = info
                    .shells
                    .iter()
                    .filter(|shell| next.toroidal_distance(**shell, info.rows, info.cols) <= 2.0)
                    .count();
                if count < fewest {
                    fewest = count;
                    best = dir;
                }
            }
            return best;
        }

        let mut best = candidates[0];
        let mut best_distance = -1.0f64;
        for dir in candidates {
            let next = me.pos.step(dir, 1, info.rows, info.cols);
            let min_distance = info
                .nearest_shell_distance(next)
                .unwrap_or((info.rows + info.cols) as f64);
            if min_distance > best_distance {
                best_distance = min_distance;
                best = dir;
            }
        }
        best
    }

    /// Chase: shoot on line of sight, otherwise follow (and periodically
    /// recompute) a BFS path to the nearest enemy.
    fn next_chase_action(&mut self, me: OwnState) -> Action {
        if self.in_shooting_range(me) && me.can_shoot() {
            return Action::Shoot;
        }
        let Some(info) = &self.info else {
            return Action::DoNothing;
        };
        let Some(enemy) = info.closest_enemy(me.pos) else {
            log::trace!(
                "hybrid {}/{}: no enemies visible, holding",
                self.player,
                self.tank_index
            );
            return Action::DoNothing;
        };

        if self.step % self.recalc_interval == 1 {
            self.path = self.find_path(me.pos, enemy);
        }

        // Drop path entries we already stand on.
        while self.path.first() == Some(&me.pos) {
            self.path.remove(0);
        }

        if let Some(&next) = self.path.first() {
            let info = self.info.as_ref().expect("info checked above");
            let needed = Direction::toward(me.pos, next, info.rows, info.cols);
            if let Some(rotation) = rotation_toward(me.dir, needed) {
                return rotation;
            }
            self.path.remove(0);
            return Action::MoveForward;
        }

        // No path; at least keep the cannon on the enemy.
        let info = self.info.as_ref().expect("info checked above");
        let best = Direction::toward(me.pos, enemy, info.rows, info.cols);
        if let Some(rotation) = rotation_toward(me.dir, best) {
            return rotation;
        }
        if me.can_shoot() {
            Action::Shoot
        } else {
            Action::DoNothing
        }
    }

    /// Whether an enemy sits within three forward cells on the cannon axis,
    /// with no wall or ally blocking the line.
    fn in_shooting_range(&self, me: OwnState) -> bool {
        let Some(info) = &self.info else {
            return false;
        };
        let mut current = me.pos;
        for _ in 0..SHOOTING_RANGE {
            current = current.step(me.dir, 1, info.rows, info.cols);
            if info.allies.contains(&current) || info.is_wall(current) {
                return false;
            }
            if info.enemies.contains(&current) {
                return true;
            }
        }
        false
    }

    /// BFS over free cells in all 8 directions, truncated to the path
    /// horizon. Returns an empty path when the enemy is unreachable.
    fn find_path(&self, start: Point, target: Point) -> Vec<Point> {
        let Some(info) = &self.info else {
            return Vec::new();
        };
        let mut queue = VecDeque::new();
        let mut visited: HashSet<Point> = HashSet::new();
        let mut parent: HashMap<Point, Point> = HashMap::new();

        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut reversed = Vec::new();
                let mut cursor = current;
                while cursor != start {
                    reversed.push(cursor);
                    cursor = parent.get(&cursor).copied().unwrap_or(start);
                }
                reversed.reverse();
                reversed.truncate(self.recalc_interval as usize);
                return reversed;
            }
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let neighbor =
                        Point::new(current.x + dx, current.y + dy).wrapped(info.rows, info.cols);
                    if visited.contains(&neighbor) || info.is_blocked(neighbor) {
                        continue;
                    }
                    visited.insert(neighbor);
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }
        Vec::new()
    }
}

impl TankAlgorithm for HybridAlgorithm {
    fn get_action(&mut self) -> Action {
        let action = self.choose();
        self.apply(action);
        action
    }

    fn update_battle_info(&mut self, info: BattleInfo) {
        let spawn_dir = if self.player == 1 {
            Direction::L
        } else {
            Direction::R
        };
        match (&mut self.me, info.my_pos) {
            (Some(me), Some(pos)) => me.pos = pos,
            (me @ None, Some(pos)) => {
                *me = Some(OwnState {
                    pos,
                    dir: spawn_dir,
                    ammo: info.num_shells,
                    cooldown: 0,
                    backward_phase: 0,
                });
            }
            // A view with no '%' cell leaves the model as-is.
            (_, None) => {}
        }
        self.info = Some(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BoardView;

    fn info_from(rows: &[&str], player: PlayerId) -> BattleInfo {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        BattleInfo::decode(&BoardView::from_grid(&grid), player, 3)
    }

    fn primed(rows: &[&str], player: PlayerId) -> HybridAlgorithm {
        // A large info interval keeps refresh requests out of the way.
        let mut algo = HybridAlgorithm::new(player, 0, 5, 2.0, 1000);
        algo.update_battle_info(info_from(rows, player));
        algo
    }

    #[test]
    fn test_first_action_requests_info() {
        let mut algo = HybridAlgorithm::new(1, 0, 5, 2.0, 5);
        assert_eq!(algo.get_action(), Action::GetBattleInfo);
    }

    #[test]
    fn test_rotation_toward_is_cheapest() {
        assert_eq!(rotation_toward(Direction::U, Direction::U), None);
        assert_eq!(
            rotation_toward(Direction::U, Direction::UR),
            Some(Action::RotateRight45)
        );
        assert_eq!(
            rotation_toward(Direction::U, Direction::R),
            Some(Action::RotateRight90)
        );
        assert_eq!(
            rotation_toward(Direction::U, Direction::UL),
            Some(Action::RotateLeft45)
        );
        assert_eq!(
            rotation_toward(Direction::U, Direction::L),
            Some(Action::RotateLeft90)
        );
        // The half-turn tie goes clockwise.
        assert_eq!(
            rotation_toward(Direction::U, Direction::D),
            Some(Action::RotateRight90)
        );
    }

    #[test]
    fn test_shoots_enemy_in_line_of_sight() {
        // Player 1 faces L; the enemy is two cells left, nothing between.
        let mut algo = primed(&["2 %   ", "      "], 1);
        assert_eq!(algo.get_action(), Action::Shoot);
    }

    #[test]
    fn test_wall_blocks_the_shot() {
        let mut algo = primed(&["2#%   ", "      "], 1);
        assert_ne!(algo.get_action(), Action::Shoot);
    }

    #[test]
    fn test_close_shell_triggers_evasion() {
        // A shell one cell away; the tank must evade, not advance on the
        // distant enemy.
        let mut algo = primed(&["%*    ", "      ", "     2"], 1);
        let action = algo.get_action();
        assert!(
            matches!(
                action,
                Action::MoveForward
                    | Action::MoveBackward
                    | Action::RotateLeft45
                    | Action::RotateLeft90
                    | Action::RotateRight45
                    | Action::RotateRight90
            ),
            "expected an evasive action, got {action}"
        );
    }

    #[test]
    fn test_bfs_path_goes_around_wall() {
        let algo = primed(&["%#2", " # ", "   "], 1);
        let path = algo.find_path(Point::new(0, 0), Point::new(0, 2));
        assert!(!path.is_empty());
        // Every step is a free cell.
        let info = algo.info.as_ref().unwrap();
        for step in &path {
            assert!(!info.is_blocked(*step));
        }
    }

    #[test]
    fn test_bfs_unreachable_target_gives_empty_path() {
        // The enemy is sealed in by walls on a non-wrapping-scale board.
        let algo = primed(
            &["%    ", " ### ", " #2# ", " ### ", "     "],
            1,
        );
        let path = algo.find_path(Point::new(0, 0), Point::new(2, 2));
        assert!(path.is_empty());
    }

    #[test]
    fn test_periodic_info_refresh() {
        let mut algo = HybridAlgorithm::new(1, 0, 5, 2.0, 2);
        assert_eq!(algo.get_action(), Action::GetBattleInfo);
        algo.update_battle_info(info_from(&["%    ", "    2"], 1));
        // step is now 2; 2 % 2 == 0 forces a refresh.
        assert_eq!(algo.get_action(), Action::GetBattleInfo);
    }
}
