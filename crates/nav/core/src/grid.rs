//! Grid primitives shared by every navigation component.
//!
//! Coordinates follow the usual map convention: `+x` is East and `+y` is North.
//! Directions are ordered clockwise starting at North, so rotating right means
//! stepping forward through [`Direction::ALL`].

use core::fmt;

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighboring position one step in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Squared Euclidean distance. Widened to `i64` so it never overflows.
    #[inline]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx * dx + dy * dy
    }

    /// Chebyshev (king-move) distance: the minimum number of 8-way steps.
    pub fn chebyshev(self, other: Self) -> u64 {
        let dx = (i64::from(other.x) - i64::from(self.x)).unsigned_abs();
        let dy = (i64::from(other.y) - i64::from(self.y)).unsigned_abs();
        dx.max(dy)
    }

    /// Nearest of the eight compass headings to the true bearing toward `other`.
    ///
    /// Returns `None` when both positions coincide.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        if dx == 0 && dy == 0 {
            return None;
        }

        let (ax, ay) = (dx.abs(), dy.abs());
        // tan(22.5°) ≈ 0.414 separates an axis heading from a diagonal one.
        let direction = if ay * 1000 <= ax * 414 {
            if dx > 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if ax * 1000 <= ay * 414 {
            if dy > 0 {
                Direction::North
            } else {
                Direction::South
            }
        } else {
            match (dx > 0, dy > 0) {
                (true, true) => Direction::NorthEast,
                (true, false) => Direction::SouthEast,
                (false, true) => Direction::NorthWest,
                (false, false) => Direction::SouthWest,
            }
        };
        Some(direction)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the eight compass headings.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const COUNT: usize = 8;

    /// Clockwise from North.
    pub const ALL: [Direction; Self::COUNT] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    /// 45° counter-clockwise.
    #[inline]
    pub const fn rotate_left(self) -> Self {
        Self::from_index(self.index() + Self::COUNT - 1)
    }

    /// 45° clockwise.
    #[inline]
    pub const fn rotate_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + Self::COUNT / 2)
    }

    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Signed number of 45° steps from `reference` to `self`, in `-3..=4`.
    ///
    /// Positive values are clockwise (to the right of `reference`).
    pub const fn offset_from(self, reference: Direction) -> i8 {
        let diff = (self.index() + Self::COUNT - reference.index()) % Self::COUNT;
        if diff > Self::COUNT / 2 {
            diff as i8 - Self::COUNT as i8
        } else {
            diff as i8
        }
    }

    /// Unsigned number of 45° steps between the two headings, in `0..=4`.
    #[inline]
    pub const fn rotation_distance(self, other: Direction) -> u8 {
        self.offset_from(other).unsigned_abs()
    }
}

/// The side on which an obstacle is kept while wall-following.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Hand {
    #[default]
    Left,
    Right,
}

impl Hand {
    pub const fn flipped(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    /// Rotates `direction` one step away from the obstacle side.
    ///
    /// With the obstacle on the right the sweep turns left, and vice versa.
    #[inline]
    pub const fn sweep(self, direction: Direction) -> Direction {
        match self {
            Hand::Left => direction.rotate_right(),
            Hand::Right => direction.rotate_left(),
        }
    }

    #[inline]
    pub(crate) const fn bit(self) -> u64 {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// Board extent used to validate positions and size per-board tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && i64::from(position.x) < i64::from(self.width)
            && i64::from(position.y) < i64::from(self.height)
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
