//! Reference orchestrator for `nav-core`.
//!
//! Hosts agents on an in-memory [`world::GridWorld`], drives one
//! [`nav_core::Navigator`] per agent each tick and reports how every agent's
//! run ended. The `nav-sim` binary wraps this for scenario files.

pub mod render;
pub mod runner;
pub mod world;

pub use render::render_paths;
pub use runner::{AgentReport, Outcome, SimReport, Simulation};
pub use world::{AgentHandle, AgentId, AgentView, GridWorld, MoveError};
