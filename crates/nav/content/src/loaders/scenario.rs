//! Scenario loader.
//!
//! Scenario files describe the board and the agents in RON:
//!
//! ```ron
//! (
//!     name: "block",
//!     dimensions: (10, 10),
//!     // Optional; the first row is the northern edge.
//!     layout: [],
//!     walls: [(x: 4, y: 4, width: 3, height: 3)],
//!     hazards: [],
//!     ownership: [(area: (x: 0, y: 0, width: 5, height: 10), team: 1)],
//!     agents: [(name: "scout", start: (0, 5), target: (9, 5), team: 1)],
//!     max_ticks: 200,
//! )
//! ```
//!
//! Rectangles are applied after the layout, in the order walls, hazards,
//! ownership.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, ensure};
use nav_core::{MapDimensions, Position};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::scenario::{Rect, Scenario, TeamId, Terrain};

#[derive(Debug, Clone, Deserialize)]
struct ScenarioRon {
    #[serde(default)]
    name: String,
    dimensions: (u32, u32),
    #[serde(default)]
    layout: Vec<String>,
    #[serde(default)]
    walls: Vec<Rect>,
    #[serde(default)]
    hazards: Vec<Rect>,
    #[serde(default)]
    ownership: Vec<TerritoryRon>,
    agents: Vec<AgentRon>,
    #[serde(default = "default_max_ticks")]
    max_ticks: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct TerritoryRon {
    area: Rect,
    team: TeamId,
}

#[derive(Debug, Clone, Deserialize)]
struct AgentRon {
    #[serde(default)]
    name: String,
    start: (i32, i32),
    target: (i32, i32),
    #[serde(default)]
    team: TeamId,
}

fn default_max_ticks() -> u32 {
    Scenario::DEFAULT_MAX_TICKS
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file. An unnamed scenario takes the file stem.
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let mut scenario = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        if scenario.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                scenario.name = stem.to_string_lossy().into_owned();
            }
        }
        Ok(scenario)
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let data: ScenarioRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        let (width, height) = data.dimensions;
        let dims = MapDimensions::new(width, height);
        ensure!(dims.area() > 0, "board {}x{} has no cells", width, height);
        ensure!(data.max_ticks > 0, "max_ticks must be at least 1");

        let mut scenario = Scenario::open(data.name, dims)
            .with_max_ticks(data.max_ticks);

        if !data.layout.is_empty() {
            apply_layout(&mut scenario, &data.layout)?;
        }

        for (kind, rects, terrain) in [
            ("wall", &data.walls, Terrain::Wall),
            ("hazard", &data.hazards, Terrain::Hazard),
        ] {
            for rect in rects {
                ensure!(rect.fits(dims), "{} {:?} extends past the board", kind, rect);
                scenario = scenario.with_terrain(*rect, terrain);
            }
        }

        for territory in &data.ownership {
            ensure!(
                territory.area.fits(dims),
                "ownership area {:?} extends past the board",
                territory.area
            );
            scenario = scenario.with_territory(territory.area, territory.team);
        }

        ensure!(!data.agents.is_empty(), "scenario has no agents");
        let mut starts = HashSet::new();
        for (index, agent) in data.agents.into_iter().enumerate() {
            let name = if agent.name.is_empty() {
                format!("agent-{index}")
            } else {
                agent.name
            };
            let start = Position::from(agent.start);
            let target = Position::from(agent.target);

            ensure!(dims.contains(start), "{} starts off the board at {}", name, start);
            ensure!(dims.contains(target), "{} targets {} off the board", name, target);
            match scenario.terrain(start) {
                Some(terrain) if terrain.is_passable() => {}
                _ => bail!("{} starts inside a wall at {}", name, start),
            }
            ensure!(starts.insert(start), "{} shares its start {} with another agent", name, start);

            scenario = scenario.with_agent(name, start, target, agent.team);
        }

        Ok(scenario)
    }
}

fn apply_layout(scenario: &mut Scenario, layout: &[String]) -> LoadResult<()> {
    let dims = scenario.dimensions;
    ensure!(
        layout.len() == dims.height as usize,
        "layout has {} rows, expected {}",
        layout.len(),
        dims.height
    );

    for (row_index, row) in layout.iter().enumerate() {
        let y = (dims.height as usize - 1 - row_index) as i32;
        let glyphs: Vec<char> = row.chars().collect();
        ensure!(
            glyphs.len() == dims.width as usize,
            "layout row {} has {} cells, expected {}",
            row_index,
            glyphs.len(),
            dims.width
        );
        for (x, glyph) in glyphs.into_iter().enumerate() {
            let Some(terrain) = Terrain::from_glyph(glyph) else {
                bail!("unknown layout glyph {:?} in row {}", glyph, row_index);
            };
            scenario.set_terrain(Position::new(x as i32, y), terrain);
        }
    }

    Ok(())
}
