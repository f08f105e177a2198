//! The bundled scenario files load and run to the expected outcomes.

use std::path::PathBuf;

use nav_content::{ConfigLoader, ScenarioLoader};
use nav_sim::{Outcome, Simulation, render_paths};

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn bundled_scenarios_finish() {
    let config = ConfigLoader::load(&bundled("nav.toml")).unwrap();

    for (file, expected) in [
        ("block.ron", Outcome::Arrived),
        ("edge.ron", Outcome::Arrived),
        ("ring.ron", Outcome::GaveUp),
    ] {
        let scenario = ScenarioLoader::load(&bundled(file)).unwrap();
        let report = Simulation::new(&scenario, &config).unwrap().run();
        for agent in &report.agents {
            assert_eq!(agent.outcome, expected, "{file}: {}", agent.name);
        }
    }
}

#[test]
fn maze_scenario_terminates_for_every_agent() {
    let scenario = ScenarioLoader::load(&bundled("maze.ron")).unwrap();
    assert_eq!(scenario.agents.len(), 3);

    for seed in 0..4 {
        let config = nav_core::NavConfig::with_seed(seed);
        let report = Simulation::new(&scenario, &config).unwrap().run();
        for agent in &report.agents {
            assert_ne!(agent.outcome, Outcome::Timeout, "seed {seed}: {}", agent.name);
        }

        let picture = render_paths(&scenario, &report);
        assert_eq!(picture.lines().count(), 15);
    }
}
