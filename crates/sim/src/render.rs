//! Plain-text rendering of a finished run.

use std::fmt::Write;

use nav_content::{Scenario, Terrain};
use nav_core::Position;

use crate::runner::SimReport;

/// Draws the board north-up with each agent's path.
///
/// Path cells show the agent's index (mod 10), targets `X`. Later agents
/// overwrite earlier ones where paths cross.
pub fn render_paths(scenario: &Scenario, report: &SimReport) -> String {
    let dims = scenario.dimensions;
    let width = dims.width as usize;
    let mut canvas: Vec<Vec<char>> = (0..dims.height)
        .rev()
        .map(|y| {
            (0..dims.width)
                .map(|x| {
                    scenario
                        .terrain(Position::new(x as i32, y as i32))
                        .map_or(' ', Terrain::glyph)
                })
                .collect()
        })
        .collect();

    let mut mark = |position: Position, glyph: char| {
        if dims.contains(position) {
            let row = dims.height as usize - 1 - position.y as usize;
            canvas[row][position.x as usize] = glyph;
        }
    };

    for (index, agent) in report.agents.iter().enumerate() {
        let glyph = char::from_digit((index % 10) as u32, 10).unwrap_or('*');
        for &cell in &agent.path {
            mark(cell, glyph);
        }
        mark(agent.target, 'X');
    }

    let mut out = String::with_capacity((width + 1) * dims.height as usize);
    for row in canvas {
        let line: String = row.into_iter().collect();
        let _ = writeln!(out, "{line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use nav_content::Rect;
    use nav_core::{MapDimensions, NavConfig};

    use super::*;
    use crate::runner::Simulation;

    #[test]
    fn draws_walls_paths_and_targets() {
        let scenario = Scenario::open("strip", MapDimensions::new(4, 2))
            .with_wall(Rect::new(3, 1, 1, 1))
            .with_agent("a", Position::new(0, 0), Position::new(3, 0), 0);
        let report = Simulation::new(&scenario, &NavConfig::default())
            .unwrap()
            .run();

        assert_eq!(render_paths(&scenario, &report), "...#\n000X\n");
    }
}
