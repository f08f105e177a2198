//! Run a scenario file and print the per-agent report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use nav_content::{ConfigLoader, ScenarioLoader};
use nav_core::NavConfig;
use nav_sim::{Outcome, Simulation, render_paths};

/// Run a scenario and report every agent's outcome
#[derive(Parser)]
pub struct Run {
    /// Scenario file (RON)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Navigator config (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the tie-break seed from the config
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let scenario = ScenarioLoader::load(&self.scenario)?;

        let mut config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => NavConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        let report = Simulation::new(&scenario, &config)
            .with_context(|| format!("Failed to set up {}", self.scenario.display()))?
            .run();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!(
            "{} {} ({}x{}, seed {}, {} ticks)",
            style("Scenario").bold(),
            report.scenario,
            scenario.dimensions.width,
            scenario.dimensions.height,
            report.seed,
            report.ticks
        );
        println!();

        for agent in &report.agents {
            let outcome = match agent.outcome {
                Outcome::Arrived => style(agent.outcome.as_ref()).green(),
                Outcome::GaveUp => style(agent.outcome.as_ref()).yellow(),
                Outcome::Timeout => style(agent.outcome.as_ref()).red(),
            };
            println!(
                "  {:<12} {:<8} tick {:>4}  moves {:>4}  traced {:>4}  rejected {:>3}  {} -> {}",
                agent.name,
                outcome,
                agent.ticks,
                agent.moves,
                agent.traced_ticks,
                agent.rejected,
                agent.start,
                agent.target
            );
        }

        println!();
        print!("{}", render_paths(&scenario, &report));

        Ok(())
    }
}
