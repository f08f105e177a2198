//! Tick-driven simulation of a scenario.
//!
//! Every tick each unfinished agent, in spawn order, senses the world, asks
//! its own [`Navigator`] for a move and tries to execute it. An agent is done
//! once it stands on its target or its navigator gives up; agents still
//! moving at `max_ticks` time out.

use nav_content::Scenario;
use nav_core::{NavConfig, NavMode, Navigator, Position, StepOutcome, compute_seed};
use serde::Serialize;

use crate::world::{AgentId, GridWorld};

/// How an agent's run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Arrived,
    GaveUp,
    Timeout,
}

/// Per-agent summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub start: Position,
    pub target: Position,
    pub outcome: Outcome,
    /// Tick on which the outcome was reached.
    pub ticks: u32,
    pub moves: usize,
    /// Ticks that ended with the navigator tracing an obstacle.
    pub traced_ticks: u32,
    pub rejected: u32,
    pub blocked: u32,
    /// Every cell occupied, starting with `start`.
    pub path: Vec<Position>,
}

/// Result of a whole run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub scenario: String,
    pub seed: u64,
    pub ticks: u32,
    pub agents: Vec<AgentReport>,
}

impl SimReport {
    pub fn all_arrived(&self) -> bool {
        self.agents
            .iter()
            .all(|agent| agent.outcome == Outcome::Arrived)
    }
}

#[derive(Clone, Debug)]
struct AgentRun {
    id: AgentId,
    name: String,
    target: Position,
    navigator: Navigator,
    path: Vec<Position>,
    finished: Option<(Outcome, u32)>,
    traced_ticks: u32,
    rejected: u32,
    blocked: u32,
}

/// A scenario in progress.
#[derive(Clone, Debug)]
pub struct Simulation {
    name: String,
    seed: u64,
    world: GridWorld,
    runs: Vec<AgentRun>,
    max_ticks: u32,
    tick: u32,
}

impl Simulation {
    const AGENT_SEED_CONTEXT: u32 = 1;

    /// Builds the world and one navigator per agent. Each navigator gets its
    /// own seed derived from `config.seed` and the agent's index.
    pub fn new(scenario: &Scenario, config: &NavConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid navigator config: {}", e))?;
        let world = GridWorld::from_scenario(scenario)
            .map_err(|e| anyhow::anyhow!("Failed to place agents: {}", e))?;

        let runs = scenario
            .agents
            .iter()
            .enumerate()
            .map(|(id, agent)| {
                let agent_config = NavConfig {
                    seed: compute_seed(config.seed, id as u64, Self::AGENT_SEED_CONTEXT),
                    ..config.clone()
                };
                AgentRun {
                    id,
                    name: agent.name.clone(),
                    target: agent.target,
                    navigator: Navigator::new(agent_config),
                    path: vec![agent.start],
                    finished: None,
                    traced_ticks: 0,
                    rejected: 0,
                    blocked: 0,
                }
            })
            .collect();

        Ok(Self {
            name: scenario.name.clone(),
            seed: config.seed,
            world,
            runs,
            max_ticks: scenario.max_ticks,
            tick: 0,
        })
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Mutable world access, for injecting changes between ticks.
    pub fn world_mut(&mut self) -> &mut GridWorld {
        &mut self.world
    }

    pub fn navigator(&self, id: AgentId) -> Option<&Navigator> {
        self.runs.get(id).map(|run| &run.navigator)
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.max_ticks || self.runs.iter().all(|run| run.finished.is_some())
    }

    /// Advances every unfinished agent by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        let tick = self.tick;

        for run in self.runs.iter_mut().filter(|run| run.finished.is_none()) {
            let Some(mut handle) = self.world.agent_mut(run.id) else {
                continue;
            };
            let outcome = run.navigator.drive(&mut handle, run.target);

            match outcome {
                StepOutcome::Moved(_) => {
                    if let Some(position) = self.world.position(run.id) {
                        run.path.push(position);
                        if position == run.target {
                            run.finish(Outcome::Arrived, tick);
                        }
                    }
                }
                StepOutcome::Rejected(direction) => {
                    tracing::debug!("{} had move {} rejected on tick {}", run.name, direction, tick);
                    run.rejected += 1;
                }
                StepOutcome::Blocked => run.blocked += 1,
                StepOutcome::Arrived => run.finish(Outcome::Arrived, tick),
                StepOutcome::Exhausted => run.finish(Outcome::GaveUp, tick),
            }

            if run.navigator.mode() == NavMode::Tracing {
                run.traced_ticks += 1;
            }
        }
    }

    /// Runs to completion and reports.
    pub fn run(mut self) -> SimReport {
        tracing::info!(
            "running scenario {} with {} agents (seed {})",
            self.name,
            self.runs.len(),
            self.seed
        );
        while !self.is_finished() {
            self.step();
        }
        self.report()
    }

    /// Snapshot of every agent; unfinished agents report a timeout.
    pub fn report(&self) -> SimReport {
        let agents = self
            .runs
            .iter()
            .map(|run| {
                let (outcome, ticks) = run.finished.unwrap_or((Outcome::Timeout, self.tick));
                AgentReport {
                    name: run.name.clone(),
                    start: run.path.first().copied().unwrap_or(run.target),
                    target: run.target,
                    outcome,
                    ticks,
                    moves: run.path.len().saturating_sub(1),
                    traced_ticks: run.traced_ticks,
                    rejected: run.rejected,
                    blocked: run.blocked,
                    path: run.path.clone(),
                }
            })
            .collect();

        SimReport {
            scenario: self.name.clone(),
            seed: self.seed,
            ticks: self.tick,
            agents,
        }
    }
}

impl AgentRun {
    fn finish(&mut self, outcome: Outcome, tick: u32) {
        match outcome {
            Outcome::GaveUp => tracing::warn!(
                "{} gave up on {} at {:?} after {} ticks",
                self.name,
                self.target,
                self.path.last(),
                tick
            ),
            _ => tracing::info!("{} {} on tick {}", self.name, outcome, tick),
        }
        self.finished = Some((outcome, tick));
    }
}
