//! Data files for navigation scenarios.
//!
//! This crate provides loaders for RON/TOML data files:
//! - Scenarios (board layout, territory, agents) via RON
//! - Navigator configuration via TOML
//!
//! Loaded scenarios are plain data; the simulator turns them into a world.

pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use scenario::{AgentSpec, Rect, Scenario, TeamId, Terrain};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, ScenarioLoader};
