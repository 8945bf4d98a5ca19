//! Character-grid snapshots of the board.
//!
//! A [`BoardView`] is a fully detached copy: the engine renders one on
//! demand (for battle info and for the final result) and nothing in it can
//! reach back into live state.

use crate::game::board::Board;
use crate::game::entities::{EntityId, EntityKind};

/// Empty cell.
pub const CH_EMPTY: char = ' ';
/// Wall cell.
pub const CH_WALL: char = '#';
/// Mine cell.
pub const CH_MINE: char = '@';
/// Shell cell.
pub const CH_SHELL: char = '*';
/// The requesting tank itself.
pub const CH_SELF: char = '%';
/// Out-of-bounds query result; never appears inside a valid view.
pub const CH_OUT_OF_BOUNDS: char = '&';

/// An immutable char-grid snapshot of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl BoardView {
    /// Render the current board. When `requester` names a live tank, that
    /// tank is drawn as `'%'` instead of its player digit.
    #[must_use]
    pub fn from_board(board: &Board, requester: Option<EntityId>) -> Self {
        let mut view = Self::blank(board.rows(), board.cols());
        for (id, entity) in board.entities() {
            let ch = match &entity.kind {
                EntityKind::Wall(_) => CH_WALL,
                EntityKind::Mine => CH_MINE,
                EntityKind::Shell(_) => CH_SHELL,
                EntityKind::Tank(tank) => {
                    if requester == Some(id) {
                        CH_SELF
                    } else if tank.player == 1 {
                        '1'
                    } else {
                        '2'
                    }
                }
            };
            let idx = entity.pos.x as usize * view.cols + entity.pos.y as usize;
            view.cells[idx] = ch;
        }
        view
    }

    /// Build a view from pre-normalized grid rows (the map parser output).
    /// Every row must already be exactly `cols` long.
    #[must_use]
    pub fn from_grid(grid: &[Vec<char>]) -> Self {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows * cols);
        for row in grid {
            cells.extend_from_slice(row);
        }
        Self { rows, cols, cells }
    }

    /// An all-empty view.
    #[must_use]
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CH_EMPTY; rows * cols],
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The character at `(x, y)`, or `'&'` when the query is out of bounds.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> char {
        if x >= self.rows || y >= self.cols {
            return CH_OUT_OF_BOUNDS;
        }
        self.cells[x * self.cols + y]
    }

    /// The view as one string per row.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows)
            .map(|x| self.cells[x * self.cols..(x + 1) * self.cols].iter().collect())
            .collect()
    }
}

impl std::fmt::Display for BoardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
