//! End-to-end navigation scenarios on the in-memory world.

use nav_content::{Rect, Scenario, Terrain};
use nav_core::{
    Direction, MapDimensions, MoveExecutor, NavConfig, NavMode, Navigator, Position,
    SensingOracle, StepOutcome, TileOwnership,
};
use nav_sim::{AgentHandle, GridWorld, Outcome, SimReport, Simulation};

fn run(scenario: &Scenario, seed: u64) -> SimReport {
    Simulation::new(scenario, &NavConfig::with_seed(seed))
        .expect("valid scenario")
        .run()
}

/// 10x10 board with a solid 3x3 block centered on (5, 5).
fn block_scenario() -> Scenario {
    Scenario::open("block", MapDimensions::new(10, 10))
        .with_wall(Rect::new(4, 4, 3, 3))
        .with_agent("scout", Position::new(0, 5), Position::new(9, 5), 0)
}

#[test]
fn open_board_paths_take_the_chebyshev_distance() {
    let pairs = [
        (Position::new(0, 0), Position::new(19, 19)),
        (Position::new(3, 17), Position::new(15, 2)),
        (Position::new(10, 10), Position::new(10, 0)),
        (Position::new(18, 4), Position::new(1, 9)),
    ];

    for (start, target) in pairs {
        let scenario = Scenario::open("open", MapDimensions::new(20, 20))
            .with_agent("walker", start, target, 0);
        let report = run(&scenario, 0);
        let agent = &report.agents[0];

        assert_eq!(agent.outcome, Outcome::Arrived);
        assert_eq!(agent.moves as u64, start.chebyshev(target), "{start} -> {target}");
        assert_eq!(agent.traced_ticks, 0);
    }
}

#[test]
fn block_is_circumnavigated_in_a_reproducible_number_of_moves() {
    for seed in 0..16 {
        let report = run(&block_scenario(), seed);
        let agent = &report.agents[0];

        assert_eq!(agent.outcome, Outcome::Arrived, "seed {seed}");
        assert_eq!(agent.moves, 10, "seed {seed}");
        assert_eq!(agent.traced_ticks, 2, "seed {seed}");
        // Greedy runs straight up to the block before tracing starts.
        assert_eq!(agent.path[3], Position::new(3, 5));
        assert!(agent.path.iter().all(|cell| !Rect::new(4, 4, 3, 3).contains(*cell)));
    }
}

#[test]
fn rectangle_trace_escapes_within_twice_its_perimeter() {
    let rect = Rect::new(8, 5, 4, 10);
    for seed in 0..8 {
        let scenario = Scenario::open("rectangle", MapDimensions::new(20, 20))
            .with_wall(rect)
            .with_agent("scout", Position::new(2, 10), Position::new(17, 10), 0);
        let report = run(&scenario, seed);
        let agent = &report.agents[0];

        assert_eq!(agent.outcome, Outcome::Arrived, "seed {seed}");
        assert!(agent.traced_ticks > 0);
        assert!(agent.traced_ticks <= 2 * rect.perimeter(), "seed {seed}");
    }
}

#[test]
fn board_edge_flips_the_hand_and_the_trace_continues() {
    let mut flipped_runs = 0;
    for seed in 0..16 {
        let scenario = Scenario::open("edge", MapDimensions::new(10, 10))
            .with_wall(Rect::new(5, 0, 1, 8))
            .with_agent("scout", Position::new(8, 1), Position::new(0, 1), 0);
        let mut sim = Simulation::new(&scenario, &NavConfig::with_seed(seed)).unwrap();

        let mut flips = 0;
        while !sim.is_finished() {
            sim.step();
            if let Some(trace) = sim.navigator(0).and_then(Navigator::trace) {
                flips = flips.max(trace.flips());
            }
        }

        let report = sim.report();
        assert_eq!(report.agents[0].outcome, Outcome::Arrived, "seed {seed}");
        if flips > 0 {
            flipped_runs += 1;
        }
    }
    assert!(flipped_runs > 0, "no seed traced into the board edge");
}

#[test]
fn target_change_mid_trace_restarts_greedy_on_the_same_call() {
    let scenario = block_scenario();
    let mut world = GridWorld::from_scenario(&scenario).unwrap();
    let mut nav = Navigator::default();
    let target = Position::new(9, 5);

    while nav.mode() != NavMode::Tracing {
        let mut agent = world.agent_mut(0).unwrap();
        assert!(matches!(nav.drive(&mut agent, target), StepOutcome::Moved(_)));
    }

    let behind = Position::new(0, 5);
    let view = world.agent(0).unwrap();
    let direction = nav.step(&view, behind).expect("greedy step");

    assert_eq!(nav.mode(), NavMode::Greedy);
    assert!(nav.trace().is_none());
    let here = view.position();
    let there = here.step(direction);
    assert!(there.distance_squared(behind) < here.distance_squared(behind));
    assert!(matches!(
        direction,
        Direction::West | Direction::SouthWest | Direction::NorthWest
    ));
}

#[test]
fn enclosed_target_ends_in_give_up() {
    let scenario = Scenario::open("ring", MapDimensions::new(7, 7))
        .with_wall(Rect::new(1, 1, 5, 1))
        .with_wall(Rect::new(1, 5, 5, 1))
        .with_wall(Rect::new(1, 2, 1, 3))
        .with_wall(Rect::new(5, 2, 1, 3))
        .with_agent("scout", Position::new(0, 3), Position::new(3, 3), 0)
        .with_max_ticks(1_000);

    for seed in 0..4 {
        let report = run(&scenario, seed);
        let agent = &report.agents[0];
        assert_eq!(agent.outcome, Outcome::GaveUp, "seed {seed}");
        assert!(agent.ticks < 200);
    }
}

#[test]
fn mazes_terminate_with_arrival_or_give_up() {
    let layout = [
        "...............",
        ".#####.#######.",
        ".#...#.#.....#.",
        ".#.#.#.#.###.#.",
        ".#.#...#.#...#.",
        ".#.#####.#.###.",
        ".#.......#.....",
        ".#########.###.",
        "...........#...",
        "####.#######.##",
        "...#.#.......#.",
        ".#.#.#.#####.#.",
        ".#...#.#...#...",
        ".#####.#.#.###.",
        ".........#.....",
    ];
    let dims = MapDimensions::new(15, 15);
    let mut base = Scenario::open("maze", dims).with_max_ticks(20_000);
    for (row, line) in layout.iter().enumerate() {
        let y = 14 - row as i32;
        for (x, glyph) in line.chars().enumerate() {
            let terrain = Terrain::from_glyph(glyph).unwrap();
            base.set_terrain(Position::new(x as i32, y), terrain);
        }
    }

    let routes = [
        (Position::new(0, 0), Position::new(14, 14)),
        (Position::new(14, 0), Position::new(2, 12)),
        (Position::new(0, 14), Position::new(8, 6)),
        (Position::new(6, 10), Position::new(14, 2)),
    ];
    for (start, target) in routes {
        for seed in 0..4 {
            let scenario = base.clone().with_agent("walker", start, target, 0);
            let report = run(&scenario, seed);
            let agent = &report.agents[0];
            assert_ne!(agent.outcome, Outcome::Timeout, "{start} -> {target}, seed {seed}");
            if agent.outcome == Outcome::Arrived {
                assert_eq!(agent.path.last(), Some(&target));
            }
        }
    }
}

#[test]
fn hazards_are_avoided_while_safe_steps_exist() {
    let scenario = Scenario::open("hazard", MapDimensions::new(7, 3))
        .with_terrain(Rect::new(3, 1, 1, 1), Terrain::Hazard)
        .with_agent("scout", Position::new(0, 1), Position::new(6, 1), 0);
    let report = run(&scenario, 0);
    let agent = &report.agents[0];

    assert_eq!(agent.outcome, Outcome::Arrived);
    assert_eq!(agent.moves, 6);
    assert!(!agent.path.contains(&Position::new(3, 1)));
}

#[test]
fn own_territory_wins_distance_ties() {
    for seed in 0..8 {
        let scenario = Scenario::open("territory", MapDimensions::new(3, 3))
            .with_wall(Rect::new(1, 1, 1, 1))
            .with_territory(Rect::new(1, 0, 1, 1), 4)
            .with_territory(Rect::new(1, 2, 1, 1), 5)
            .with_agent("scout", Position::new(0, 1), Position::new(2, 1), 4);
        let report = run(&scenario, seed);

        assert_eq!(report.agents[0].path[1], Position::new(1, 0), "seed {seed}");
    }
}

/// Refuses a fixed number of moves before handing through to the world.
struct Flaky<'a> {
    inner: AgentHandle<'a>,
    refusals: u32,
}

impl SensingOracle for Flaky<'_> {
    fn position(&self) -> Position {
        self.inner.position()
    }

    fn dimensions(&self) -> MapDimensions {
        self.inner.dimensions()
    }

    fn is_passable(&self, position: Position) -> bool {
        self.inner.is_passable(position)
    }

    fn is_occupied(&self, position: Position) -> bool {
        self.inner.is_occupied(position)
    }

    fn tile_ownership(&self, position: Position) -> TileOwnership {
        self.inner.tile_ownership(position)
    }

    fn is_unsafe(&self, position: Position) -> bool {
        self.inner.is_unsafe(position)
    }
}

impl MoveExecutor for Flaky<'_> {
    fn try_move(&mut self, direction: Direction) -> bool {
        if self.refusals > 0 {
            self.refusals -= 1;
            return false;
        }
        self.inner.try_move(direction)
    }
}

#[test]
fn rejected_moves_are_retried_unchanged() {
    let scenario = block_scenario();
    let mut world = GridWorld::from_scenario(&scenario).unwrap();
    let target = Position::new(9, 5);
    let mut nav = Navigator::new(NavConfig::with_seed(5));
    let mut reference = nav.clone();
    let mut reference_world = world.clone();

    let mut moves = 0;
    loop {
        let expected = {
            let mut agent = reference_world.agent_mut(0).unwrap();
            reference.drive(&mut agent, target)
        };

        // Every tick is first refused once, then retried.
        let mut flaky = Flaky {
            inner: world.agent_mut(0).unwrap(),
            refusals: 1,
        };
        match nav.drive(&mut flaky, target) {
            StepOutcome::Rejected(direction) => {
                assert_eq!(expected, StepOutcome::Moved(direction));
                assert_eq!(nav.drive(&mut flaky, target), expected);
                moves += 1;
            }
            outcome => {
                assert_eq!(outcome, expected);
                break;
            }
        }
        assert_eq!(nav.mode(), reference.mode());
        assert!(moves < 40);
    }

    assert_eq!(moves, 10);
    assert_eq!(world.position(0), Some(target));
}

#[test]
fn same_seed_same_paths() {
    let scenario = Scenario::open("crowd", MapDimensions::new(16, 16))
        .with_wall(Rect::new(6, 3, 2, 10))
        .with_wall(Rect::new(10, 0, 1, 9))
        .with_agent("a", Position::new(1, 8), Position::new(14, 8), 0)
        .with_agent("b", Position::new(14, 2), Position::new(2, 14), 1)
        .with_agent("c", Position::new(3, 1), Position::new(12, 12), 0);

    let first = run(&scenario, 77);
    let second = run(&scenario, 77);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
