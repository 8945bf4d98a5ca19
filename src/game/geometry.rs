//! Grid geometry: points, compass directions, toroidal arithmetic.

/// A cell position on the board.
///
/// `x` is the row and `y` is the column. Values are kept in-range by the
/// wrapping constructors; intermediate arithmetic may go negative, which is
/// why the components are signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Row index.
    pub x: i32,
    /// Column index.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Wrap this point onto a `rows` x `cols` torus using the non-negative
    /// modulus.
    #[must_use]
    pub fn wrapped(self, rows: usize, cols: usize) -> Self {
        Self {
            x: self.x.rem_euclid(rows as i32),
            y: self.y.rem_euclid(cols as i32),
        }
    }

    /// The cell reached by stepping `steps` times in `dir`, wrapped onto the
    /// torus. Negative `steps` walks the opposite way.
    #[must_use]
    pub fn step(self, dir: Direction, steps: i32, rows: usize, cols: usize) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx * steps, self.y + dy * steps).wrapped(rows, cols)
    }

    /// Per-axis delta to `other`, folded onto the shorter way around the
    /// torus.
    #[must_use]
    pub fn toroidal_delta(self, other: Point, rows: usize, cols: usize) -> (i32, i32) {
        let fold = |mut d: i32, size: i32| {
            if d.abs() > size / 2 {
                d = if d > 0 { d - size } else { d + size };
            }
            d
        };
        (
            fold(other.x - self.x, rows as i32),
            fold(other.y - self.y, cols as i32),
        )
    }

    /// Euclidean distance to `other`, measured on the shorter toroidal
    /// delta per axis.
    #[must_use]
    pub fn toroidal_distance(self, other: Point, rows: usize, cols: usize) -> f64 {
        let (dx, dy) = self.toroidal_delta(other, rows, cols);
        f64::from(dx * dx + dy * dy).sqrt()
    }
}

/// One of the eight compass directions a cannon or shell can face.
///
/// The discriminants are the rotation indices: stepping the index by ±1
/// rotates by 45 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// Up (toward row 0).
    U = 0,
    /// Up-right diagonal.
    UR = 1,
    /// Right (toward higher columns).
    R = 2,
    /// Down-right diagonal.
    DR = 3,
    /// Down (toward higher rows).
    D = 4,
    /// Down-left diagonal.
    DL = 5,
    /// Left (toward column 0).
    L = 6,
    /// Up-left diagonal.
    UL = 7,
}

/// All eight directions in rotation order.
pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::U,
    Direction::UR,
    Direction::R,
    Direction::DR,
    Direction::D,
    Direction::DL,
    Direction::L,
    Direction::UL,
];

impl Direction {
    /// Unit offset `(dx, dy)` for this direction, with `dx` along rows.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::U => (-1, 0),
            Direction::UR => (-1, 1),
            Direction::R => (0, 1),
            Direction::DR => (1, 1),
            Direction::D => (1, 0),
            Direction::DL => (1, -1),
            Direction::L => (0, -1),
            Direction::UL => (-1, -1),
        }
    }

    /// Direction for a rotation index, taken mod 8.
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        ALL_DIRECTIONS[index.rem_euclid(8) as usize]
    }

    /// Rotation index of this direction.
    #[must_use]
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Rotate counter-clockwise by `k` eighths of a turn.
    #[must_use]
    pub fn rotated_left(self, k: i32) -> Self {
        Self::from_index(self.index() - k)
    }

    /// Rotate clockwise by `k` eighths of a turn.
    #[must_use]
    pub fn rotated_right(self, k: i32) -> Self {
        Self::from_index(self.index() + k)
    }

    /// The compass direction that points from `from` toward `to` on the
    /// torus. Returns `U` when the points coincide.
    #[must_use]
    pub fn toward(from: Point, to: Point, rows: usize, cols: usize) -> Self {
        let (dx, dy) = from.toroidal_delta(to, rows, cols);
        match (dx.signum(), dy.signum()) {
            (-1, 0) => Direction::U,
            (-1, 1) => Direction::UR,
            (0, 1) => Direction::R,
            (1, 1) => Direction::DR,
            (1, 0) => Direction::D,
            (1, -1) => Direction::DL,
            (0, -1) => Direction::L,
            (-1, -1) => Direction::UL,
            _ => Direction::U,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::U => "U",
            Direction::UR => "UR",
            Direction::R => "R",
            Direction::DR => "DR",
            Direction::D => "D",
            Direction::DL => "DL",
            Direction::L => "L",
            Direction::UL => "UL",
        };
        write!(f, "{name}")
    }
}
