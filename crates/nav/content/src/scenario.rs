//! Scenario data: board terrain, territory and the agents to route.

use nav_core::{MapDimensions, Position};

/// Team identifier used for tile ownership.
pub type TeamId = u8;

/// Static terrain of one cell.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    /// Passable, but agents avoid it while any alternative exists.
    Hazard,
}

impl Terrain {
    /// Layout glyph: `.` floor, `#` wall, `~` hazard.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Terrain::Floor),
            '#' => Some(Terrain::Wall),
            '~' => Some(Terrain::Hazard),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Terrain::Floor => '.',
            Terrain::Wall => '#',
            Terrain::Hazard => '~',
        }
    }

    pub fn is_passable(self) -> bool {
        !matches!(self, Terrain::Wall)
    }

    pub fn is_unsafe(self) -> bool {
        matches!(self, Terrain::Hazard)
    }
}

/// Axis-aligned block of cells anchored at its south-west corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        let dx = i64::from(position.x) - i64::from(self.x);
        let dy = i64::from(position.y) - i64::from(self.y);
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }

    /// Whether every cell of the rectangle lies on a board of `dims`.
    pub fn fits(&self, dims: MapDimensions) -> bool {
        self.x >= 0
            && self.y >= 0
            && i64::from(self.x) + i64::from(self.width) <= i64::from(dims.width)
            && i64::from(self.y) + i64::from(self.height) <= i64::from(dims.height)
    }

    /// Cells row by row from the south-west corner.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        (0..self.height as i32).flat_map(move |dy| {
            (0..self.width as i32).map(move |dx| Position::new(self.x + dx, self.y + dy))
        })
    }

    /// Cells on the rectangle's outer ring (the obstacle perimeter).
    pub fn perimeter(&self) -> u32 {
        match (self.width, self.height) {
            (0, _) | (_, 0) => 0,
            (1, h) => h,
            (w, 1) => w,
            (w, h) => 2 * (w + h) - 4,
        }
    }
}

/// One agent to route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSpec {
    pub name: String,
    pub start: Position,
    pub target: Position,
    pub team: TeamId,
}

/// A complete board plus the agents navigating it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub dimensions: MapDimensions,
    /// Row-major terrain, `y * width + x`.
    pub tiles: Vec<Terrain>,
    /// Row-major owner of each cell.
    pub territory: Vec<Option<TeamId>>,
    pub agents: Vec<AgentSpec>,
    pub max_ticks: u32,
}

impl Scenario {
    pub const DEFAULT_MAX_TICKS: u32 = 500;

    /// An all-floor, unowned board without agents.
    pub fn open(name: impl Into<String>, dimensions: MapDimensions) -> Self {
        let area = dimensions.area() as usize;
        Self {
            name: name.into(),
            dimensions,
            tiles: vec![Terrain::Floor; area],
            territory: vec![None; area],
            agents: Vec::new(),
            max_ticks: Self::DEFAULT_MAX_TICKS,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Fills the on-board part of `rect` with `terrain`.
    pub fn with_terrain(mut self, rect: Rect, terrain: Terrain) -> Self {
        for cell in rect.cells() {
            self.set_terrain(cell, terrain);
        }
        self
    }

    pub fn with_wall(self, rect: Rect) -> Self {
        self.with_terrain(rect, Terrain::Wall)
    }

    pub fn with_territory(mut self, rect: Rect, team: TeamId) -> Self {
        for cell in rect.cells() {
            if let Some(index) = self.index(cell) {
                self.territory[index] = Some(team);
            }
        }
        self
    }

    pub fn with_agent(
        mut self,
        name: impl Into<String>,
        start: Position,
        target: Position,
        team: TeamId,
    ) -> Self {
        self.agents.push(AgentSpec {
            name: name.into(),
            start,
            target,
            team,
        });
        self
    }

    /// Sets one cell. Returns `false` if it is off the board.
    pub fn set_terrain(&mut self, position: Position, terrain: Terrain) -> bool {
        match self.index(position) {
            Some(index) => {
                self.tiles[index] = terrain;
                true
            }
            None => false,
        }
    }

    pub fn terrain(&self, position: Position) -> Option<Terrain> {
        self.index(position).map(|index| self.tiles[index])
    }

    pub fn owner(&self, position: Position) -> Option<TeamId> {
        self.index(position).and_then(|index| self.territory[index])
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.dimensions.contains(position).then(|| {
            position.y as usize * self.dimensions.width as usize + position.x as usize
        })
    }
}
