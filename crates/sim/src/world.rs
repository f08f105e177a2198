//! In-memory grid world.
//!
//! Owns terrain, territory and agent bodies. Agents see it through
//! [`AgentView`] (sensing only) or [`AgentHandle`] (sensing plus moving), the
//! two halves of the interface the navigator consumes.

use nav_content::{Scenario, TeamId, Terrain};
use nav_core::{Direction, MapDimensions, MoveExecutor, Position, SensingOracle, TileOwnership};

/// Index of an agent in spawn order.
pub type AgentId = usize;

/// Reasons the world refuses a move or a spawn.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("{0} is off the board")]
    OutOfBounds(Position),

    #[error("{0} is blocked by a wall")]
    Blocked(Position),

    #[error("{position} is occupied by agent {occupant}")]
    Occupied {
        position: Position,
        occupant: AgentId,
    },
}

#[derive(Clone, Debug)]
struct Body {
    position: Position,
    team: TeamId,
}

/// Grid world backing a simulation.
#[derive(Clone, Debug)]
pub struct GridWorld {
    dims: MapDimensions,
    tiles: Vec<Terrain>,
    territory: Vec<Option<TeamId>>,
    occupancy: Vec<Option<AgentId>>,
    bodies: Vec<Body>,
}

impl GridWorld {
    /// Builds the board of `scenario` and spawns its agents in order.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, MoveError> {
        let mut world = Self {
            dims: scenario.dimensions,
            tiles: scenario.tiles.clone(),
            territory: scenario.territory.clone(),
            occupancy: vec![None; scenario.tiles.len()],
            bodies: Vec::with_capacity(scenario.agents.len()),
        };
        for agent in &scenario.agents {
            world.spawn(agent.start, agent.team)?;
        }
        Ok(world)
    }

    /// Places a new agent on a free, passable cell.
    pub fn spawn(&mut self, position: Position, team: TeamId) -> Result<AgentId, MoveError> {
        let index = self.enterable(position)?;
        let id = self.bodies.len();
        self.bodies.push(Body { position, team });
        self.occupancy[index] = Some(id);
        Ok(id)
    }

    /// Moves an agent one step. On success returns its new position.
    pub fn move_agent(&mut self, id: AgentId, direction: Direction) -> Result<Position, MoveError> {
        let from = self
            .bodies
            .get(id)
            .map(|body| body.position)
            .ok_or(MoveError::UnknownAgent(id))?;
        let to = from.step(direction);
        let index = self.enterable(to)?;

        if let Some(previous) = self.index(from) {
            self.occupancy[previous] = None;
        }
        self.occupancy[index] = Some(id);
        self.bodies[id].position = to;
        Ok(to)
    }

    /// Read-only sensing view for one agent.
    pub fn agent(&self, id: AgentId) -> Option<AgentView<'_>> {
        self.bodies.get(id).map(|body| AgentView {
            world: self,
            id,
            position: body.position,
            team: body.team,
        })
    }

    /// Sensing and moving handle for one agent.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<AgentHandle<'_>> {
        (id < self.bodies.len()).then_some(AgentHandle { world: self, id })
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dims
    }

    pub fn agent_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn position(&self, id: AgentId) -> Option<Position> {
        self.bodies.get(id).map(|body| body.position)
    }

    pub fn terrain(&self, position: Position) -> Option<Terrain> {
        self.index(position).map(|index| self.tiles[index])
    }

    pub fn owner(&self, position: Position) -> Option<TeamId> {
        self.index(position).and_then(|index| self.territory[index])
    }

    pub fn occupant(&self, position: Position) -> Option<AgentId> {
        self.index(position).and_then(|index| self.occupancy[index])
    }

    fn enterable(&self, position: Position) -> Result<usize, MoveError> {
        let index = self.index(position).ok_or(MoveError::OutOfBounds(position))?;
        if !self.tiles[index].is_passable() {
            return Err(MoveError::Blocked(position));
        }
        if let Some(occupant) = self.occupancy[index] {
            return Err(MoveError::Occupied { position, occupant });
        }
        Ok(index)
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.dims
            .contains(position)
            .then(|| position.y as usize * self.dims.width as usize + position.x as usize)
    }
}

/// One agent's read-only view of the world.
#[derive(Clone, Copy, Debug)]
pub struct AgentView<'a> {
    world: &'a GridWorld,
    id: AgentId,
    position: Position,
    team: TeamId,
}

impl AgentView<'_> {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn team(&self) -> TeamId {
        self.team
    }
}

impl SensingOracle for AgentView<'_> {
    fn position(&self) -> Position {
        self.position
    }

    fn dimensions(&self) -> MapDimensions {
        self.world.dims
    }

    fn is_passable(&self, position: Position) -> bool {
        self.world
            .terrain(position)
            .is_some_and(Terrain::is_passable)
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.world
            .occupant(position)
            .is_some_and(|occupant| occupant != self.id)
    }

    fn tile_ownership(&self, position: Position) -> TileOwnership {
        match self.world.owner(position) {
            None => TileOwnership::Neutral,
            Some(team) if team == self.team => TileOwnership::Own,
            Some(_) => TileOwnership::Foe,
        }
    }

    fn is_unsafe(&self, position: Position) -> bool {
        self.world.terrain(position).is_some_and(Terrain::is_unsafe)
    }
}

/// One agent's handle for sensing and moving.
#[derive(Debug)]
pub struct AgentHandle<'a> {
    world: &'a mut GridWorld,
    id: AgentId,
}

impl AgentHandle<'_> {
    pub fn view(&self) -> AgentView<'_> {
        let body = &self.world.bodies[self.id];
        AgentView {
            world: &*self.world,
            id: self.id,
            position: body.position,
            team: body.team,
        }
    }
}

impl SensingOracle for AgentHandle<'_> {
    fn position(&self) -> Position {
        self.world.bodies[self.id].position
    }

    fn dimensions(&self) -> MapDimensions {
        self.world.dims
    }

    fn is_passable(&self, position: Position) -> bool {
        self.view().is_passable(position)
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.view().is_occupied(position)
    }

    fn tile_ownership(&self, position: Position) -> TileOwnership {
        self.view().tile_ownership(position)
    }

    fn is_unsafe(&self, position: Position) -> bool {
        self.view().is_unsafe(position)
    }
}

impl MoveExecutor for AgentHandle<'_> {
    fn try_move(&mut self, direction: Direction) -> bool {
        match self.world.move_agent(self.id, direction) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!("agent {} move {} refused: {}", self.id, direction, err);
                false
            }
        }
    }
}
