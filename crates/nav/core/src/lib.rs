//! Local bug-style navigation for agents on an eight-connected grid.
//!
//! `nav-core` decides one move per tick from locally sensed information only.
//! Agents head straight for the target with the [`greedy`] selector, trace the
//! perimeter of whatever blocks them with the [`wall`] follower, and rely on
//! the [`guard`] to keep every trace finite. [`navigator::Navigator`] ties the
//! pieces together and is the entry point orchestrators use; the world is seen
//! through the [`sensing::SensingOracle`] trait they implement.
pub mod config;
pub mod error;
pub mod greedy;
pub mod grid;
pub mod guard;
pub mod navigator;
pub mod rng;
pub mod sensing;
pub mod wall;

#[cfg(test)]
pub(crate) mod testing;

pub use config::NavConfig;
pub use error::{ConfigError, ErrorSeverity, GuardError, NavError};
pub use greedy::GreedyChoice;
pub use grid::{Direction, Hand, MapDimensions, Position};
pub use guard::{CycleGuard, GuardKey};
pub use navigator::{NavMode, NavState, Navigator, StepOutcome};
pub use rng::{PcgRng, TieBreaker, compute_seed};
pub use sensing::{CellFlags, MoveExecutor, Neighborhood, SensingOracle, TileOwnership};
pub use wall::{LoopReason, TraceContext, TraceStep};
