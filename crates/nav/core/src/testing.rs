//! ASCII-built oracle used by the unit tests.
//!
//! Rows are listed top to bottom, so the first row has the highest `y`.
//!
//! | char | meaning |
//! |------|---------|
//! | `.`  | neutral floor |
//! | `#`  | wall |
//! | `~`  | hazard: passable but unsafe |
//! | `o`  | floor occupied by another unit |
//! | `S`  | floor owned by the agent's side |
//! | `F`  | floor owned by a foe |
//! | `@`  | the agent, standing on neutral floor |

use crate::grid::{Direction, MapDimensions, Position};
use crate::sensing::{MoveExecutor, SensingOracle, TileOwnership};

#[derive(Clone, Debug)]
pub(crate) struct TestGrid {
    dims: MapDimensions,
    cells: Vec<u8>,
    agent: Position,
    /// Remaining moves `try_move` will refuse before accepting again.
    pub(crate) refusals: u32,
}

impl TestGrid {
    pub(crate) fn parse(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        let mut cells = vec![b'.'; width * height];
        let mut agent = Position::ORIGIN;

        for (row_index, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "ragged test grid");
            let y = (height - 1 - row_index) as i32;
            for (x, byte) in row.bytes().enumerate() {
                let position = Position::new(x as i32, y);
                if byte == b'@' {
                    agent = position;
                    cells[Self::offset(width, position)] = b'.';
                } else {
                    cells[Self::offset(width, position)] = byte;
                }
            }
        }

        Self {
            dims: MapDimensions::new(width as u32, height as u32),
            cells,
            agent,
            refusals: 0,
        }
    }

    pub(crate) fn open(width: u32, height: u32, agent: Position) -> Self {
        Self {
            dims: MapDimensions::new(width, height),
            cells: vec![b'.'; (width * height) as usize],
            agent,
            refusals: 0,
        }
    }

    pub(crate) fn with_wall_rect(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        for cy in y..y + height {
            for cx in x..x + width {
                self.set(Position::new(cx, cy), b'#');
            }
        }
        self
    }

    pub(crate) fn set(&mut self, position: Position, byte: u8) {
        if self.dims.contains(position) {
            let offset = Self::offset(self.dims.width as usize, position);
            self.cells[offset] = byte;
        }
    }

    /// Moves the agent without going through `try_move`.
    pub(crate) fn place(&mut self, position: Position) {
        self.agent = position;
    }

    fn offset(width: usize, position: Position) -> usize {
        position.y as usize * width + position.x as usize
    }

    fn cell(&self, position: Position) -> Option<u8> {
        self.dims
            .contains(position)
            .then(|| self.cells[Self::offset(self.dims.width as usize, position)])
    }
}

impl SensingOracle for TestGrid {
    fn position(&self) -> Position {
        self.agent
    }

    fn dimensions(&self) -> MapDimensions {
        self.dims
    }

    fn is_passable(&self, position: Position) -> bool {
        matches!(self.cell(position), Some(byte) if byte != b'#')
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.cell(position) == Some(b'o')
    }

    fn tile_ownership(&self, position: Position) -> TileOwnership {
        match self.cell(position) {
            Some(b'S') => TileOwnership::Own,
            Some(b'F') => TileOwnership::Foe,
            _ => TileOwnership::Neutral,
        }
    }

    fn is_unsafe(&self, position: Position) -> bool {
        self.cell(position) == Some(b'~')
    }
}

impl MoveExecutor for TestGrid {
    fn try_move(&mut self, direction: Direction) -> bool {
        if self.refusals > 0 {
            self.refusals -= 1;
            return false;
        }
        if !self.is_passable_toward(direction) {
            return false;
        }
        self.agent = self.agent.step(direction);
        true
    }
}
