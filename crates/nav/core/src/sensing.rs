//! Sensing interface consumed by the navigator.
//!
//! The orchestrator owns the world; the navigator only ever sees it through
//! [`SensingOracle`]. At the start of every step the controller samples the
//! eight neighbors once into a [`Neighborhood`], so every decision made within a
//! tick reads the same snapshot.

use bitflags::bitflags;

use crate::grid::{Direction, MapDimensions, Position};

/// Ownership of a destination tile relative to the sensing agent.
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
pub enum TileOwnership {
    /// Controlled by the agent's own side.
    Own,
    #[default]
    Neutral,
    Foe,
}

impl TileOwnership {
    /// Step-selection preference; lower is better.
    pub const fn rank(self) -> u8 {
        match self {
            TileOwnership::Own => 0,
            TileOwnership::Neutral => 1,
            TileOwnership::Foe => 2,
        }
    }
}

/// Read-only local view of the world for a single agent.
///
/// Implementations answer against a tick-consistent snapshot and must be
/// deterministic: the same world state yields the same answers.
pub trait SensingOracle {
    /// Cell the sensing agent currently stands on.
    fn position(&self) -> Position;

    /// Board extent.
    fn dimensions(&self) -> MapDimensions;

    fn is_on_board(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }

    /// Static terrain passability.
    fn is_passable(&self, position: Position) -> bool;

    /// Whether another unit currently stands on `position`.
    fn is_occupied(&self, position: Position) -> bool;

    fn tile_ownership(&self, _position: Position) -> TileOwnership {
        TileOwnership::Neutral
    }

    /// Cells that are enterable but self-destructive to step on.
    fn is_unsafe(&self, _position: Position) -> bool {
        false
    }

    /// Whether a single step in `direction` is locally legal.
    fn is_passable_toward(&self, direction: Direction) -> bool {
        let destination = self.position().step(direction);
        self.is_on_board(destination)
            && self.is_passable(destination)
            && !self.is_occupied(destination)
    }
}

/// Move capability held by the orchestrator.
///
/// `try_move` may refuse a step the oracle advertised as passable; the
/// navigator treats that as a transient race and rolls the tick back.
pub trait MoveExecutor {
    fn try_move(&mut self, direction: Direction) -> bool;
}

bitflags! {
    /// What the agent sensed about one neighboring cell.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CellFlags: u8 {
        const ON_BOARD = 1 << 0;
        const PASSABLE = 1 << 1;
        const OCCUPIED = 1 << 2;
        const UNSAFE   = 1 << 3;
    }
}

impl CellFlags {
    /// On board, passable terrain, and nobody standing there.
    #[inline]
    pub fn is_legal(self) -> bool {
        self.contains(CellFlags::ON_BOARD | CellFlags::PASSABLE)
            && !self.contains(CellFlags::OCCUPIED)
    }

    #[inline]
    pub fn is_safe_legal(self) -> bool {
        self.is_legal() && !self.contains(CellFlags::UNSAFE)
    }
}

/// Snapshot of the eight cells around the agent, indexed by [`Direction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    origin: Position,
    cells: [CellFlags; Direction::COUNT],
    ownership: [TileOwnership; Direction::COUNT],
}

impl Neighborhood {
    pub const fn new(
        origin: Position,
        cells: [CellFlags; Direction::COUNT],
        ownership: [TileOwnership; Direction::COUNT],
    ) -> Self {
        Self {
            origin,
            cells,
            ownership,
        }
    }

    /// Samples every neighbor of the agent from the oracle.
    pub fn sense<O: SensingOracle + ?Sized>(oracle: &O) -> Self {
        let origin = oracle.position();
        let mut cells = [CellFlags::empty(); Direction::COUNT];
        let mut ownership = [TileOwnership::Neutral; Direction::COUNT];

        for direction in Direction::ALL {
            let cell = origin.step(direction);
            if !oracle.is_on_board(cell) {
                continue;
            }

            let mut flags = CellFlags::ON_BOARD;
            flags.set(CellFlags::PASSABLE, oracle.is_passable(cell));
            flags.set(CellFlags::OCCUPIED, oracle.is_occupied(cell));
            flags.set(CellFlags::UNSAFE, oracle.is_unsafe(cell));
            cells[direction.index()] = flags;
            ownership[direction.index()] = oracle.tile_ownership(cell);
        }

        Self::new(origin, cells, ownership)
    }

    #[inline]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    #[inline]
    pub fn flags(&self, direction: Direction) -> CellFlags {
        self.cells[direction.index()]
    }

    #[inline]
    pub fn ownership(&self, direction: Direction) -> TileOwnership {
        self.ownership[direction.index()]
    }

    #[inline]
    pub fn is_legal(&self, direction: Direction) -> bool {
        self.flags(direction).is_legal()
    }

    #[inline]
    pub fn is_safe_legal(&self, direction: Direction) -> bool {
        self.flags(direction).is_safe_legal()
    }

    #[inline]
    pub fn is_on_board(&self, direction: Direction) -> bool {
        self.flags(direction).contains(CellFlags::ON_BOARD)
    }

    /// Number of neighbors a step could legally enter.
    pub fn legal_count(&self) -> usize {
        self.cells.iter().filter(|flags| flags.is_legal()).count()
    }
}
