//! Scenario runner for the navigation engine.
//!
//! Run with: `nav-sim run <scenario.ron> [--config nav.toml] [--seed N] [--json]`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Run;

/// Scenario runner for the navigation engine
#[derive(Parser)]
#[command(name = "nav-sim")]
#[command(about = "Run navigation scenarios", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Simulate a scenario file
    Run(Run),
}

fn main() -> Result<()> {
    // Load .env file if it exists (RUST_LOG and friends)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
    }
}
