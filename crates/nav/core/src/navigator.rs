//! Per-agent navigation controller.
//!
//! [`Navigator`] is the only stateful piece of the engine. Each call to
//! [`Navigator::step`] senses the neighborhood once, then runs either the
//! greedy selector or the wall follower and returns at most one direction.
//!
//! ```text
//! Idle ──new target──▶ Greedy ──no progress / stall──▶ Tracing
//!                        ▲                               │
//!                        └──────── escaped / looped ─────┘
//! ```
//!
//! Every looped trace without a new overall best is a strike. Once the strikes
//! reach [`NavConfig::max_loop_strikes`] the navigator parks in `Idle` and keeps
//! the target, so further steps toward it return `None` until [`reset`] or a
//! different target.
//!
//! [`reset`]: Navigator::reset

use arrayvec::ArrayVec;

use crate::config::NavConfig;
use crate::error::{ConfigError, NavError};
use crate::greedy::{self, GreedyChoice};
use crate::grid::{Direction, Hand, MapDimensions, Position};
use crate::guard::CycleGuard;
use crate::rng::TieBreaker;
use crate::sensing::{MoveExecutor, Neighborhood, SensingOracle};
use crate::wall::{TraceContext, TraceMarker, TraceStep};

/// Controller state.
#[derive(Clone, Debug, Default)]
pub enum NavState {
    /// No target, or the current target was given up on.
    #[default]
    Idle,
    Greedy,
    Tracing(TraceContext),
}

impl NavState {
    pub fn mode(&self) -> NavMode {
        match self {
            NavState::Idle => NavMode::Idle,
            NavState::Greedy => NavMode::Greedy,
            NavState::Tracing(_) => NavMode::Tracing,
        }
    }
}

/// Discriminant of [`NavState`].
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
pub enum NavMode {
    #[default]
    Idle,
    Greedy,
    Tracing,
}

/// What [`Navigator::drive`] did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Direction),
    /// The executor refused the move; the tick was rolled back.
    Rejected(Direction),
    /// No legal step this tick.
    Blocked,
    Arrived,
    /// The navigator gave up on the target.
    Exhausted,
}

/// Rolling window of recently occupied cells.
#[derive(Clone, Debug)]
struct History {
    cells: ArrayVec<Position, { NavConfig::MAX_HISTORY }>,
    limit: usize,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            cells: ArrayVec::new(),
            limit: limit.clamp(1, NavConfig::MAX_HISTORY),
        }
    }

    fn push(&mut self, position: Position) {
        if self.cells.last() == Some(&position) {
            return;
        }
        if self.cells.len() >= self.limit {
            self.cells.remove(0);
        }
        self.cells.push(position);
    }

    fn as_slice(&self) -> &[Position] {
        &self.cells
    }

    fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Distance bookkeeping for stall detection and give-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Progress {
    greedy_best: i64,
    stalled: u32,
    overall_best: i64,
    strikes: u32,
}

impl Progress {
    const FRESH: Self = Self {
        greedy_best: i64::MAX,
        stalled: 0,
        overall_best: i64::MAX,
        strikes: 0,
    };

    fn record_overall(&mut self, distance: i64) {
        if distance < self.overall_best {
            self.overall_best = distance;
            self.strikes = 0;
        }
    }

    /// Returns `true` once `threshold` greedy calls passed without a new best.
    fn record_greedy(&mut self, distance: i64, threshold: u32) -> bool {
        if distance < self.greedy_best {
            self.greedy_best = distance;
            self.stalled = 0;
        } else {
            self.stalled = self.stalled.saturating_add(1);
        }
        self.stalled >= threshold
    }

    fn restart_greedy(&mut self) {
        self.greedy_best = i64::MAX;
        self.stalled = 0;
    }
}

#[derive(Clone, Copy, Debug)]
enum ModeMark {
    Greedy,
    Tracing(TraceMarker),
}

/// Everything a step may change, captured before it runs.
#[derive(Clone, Debug)]
struct Checkpoint {
    mode: ModeMark,
    /// Trace context left during the step, kept until the move is accepted.
    parked: Option<TraceContext>,
    progress: Progress,
    history: History,
    nonce: u64,
}

/// Inputs shared by every decision within one step.
struct Tick {
    neighborhood: Neighborhood,
    target: Position,
    distance: i64,
    lean: Hand,
    dims: MapDimensions,
}

/// Local navigation controller for a single agent.
#[derive(Clone, Debug)]
pub struct Navigator {
    config: NavConfig,
    state: NavState,
    target: Option<Position>,
    history: History,
    progress: Progress,
    tie_break: TieBreaker,
    checkpoint: Option<Checkpoint>,
    spare_guard: Option<CycleGuard>,
}

impl Navigator {
    /// Creates a navigator. Out-of-range history lengths are clamped; use
    /// [`try_new`](Self::try_new) to reject them instead.
    pub fn new(config: NavConfig) -> Self {
        Self {
            history: History::new(config.history_len),
            tie_break: TieBreaker::new(config.seed),
            config,
            state: NavState::Idle,
            target: None,
            progress: Progress::FRESH,
            checkpoint: None,
            spare_guard: None,
        }
    }

    pub fn try_new(config: NavConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Drops all navigation progress and forgets the target.
    pub fn reset(&mut self) {
        if let NavState::Tracing(ctx) = std::mem::take(&mut self.state) {
            self.spare_guard = Some(ctx.into_guard());
        }
        self.target = None;
        self.history.clear();
        self.progress = Progress::FRESH;
        self.checkpoint = None;
        self.tie_break.restart();
    }

    /// Chooses the next move toward `target`.
    ///
    /// Returns `None` when the agent is on the target, has no legal step this
    /// tick, or has given up on the target.
    pub fn step<O>(&mut self, oracle: &O, target: Position) -> Option<Direction>
    where
        O: SensingOracle + ?Sized,
    {
        if self.target != Some(target) {
            if let Some(previous) = self.target {
                tracing::debug!("target changed {} -> {}, resetting", previous, target);
            }
            self.reset();
            self.target = Some(target);
            self.state = NavState::Greedy;
        }
        self.settle_checkpoint();

        if matches!(self.state, NavState::Idle) {
            return None;
        }
        let origin = oracle.position();
        if origin == target {
            return None;
        }

        self.checkpoint = Some(self.capture());

        let tick = Tick {
            neighborhood: Neighborhood::sense(oracle),
            target,
            distance: origin.distance_squared(target),
            lean: self.tie_break.lean(),
            dims: oracle.dimensions(),
        };
        self.history.push(origin);
        self.progress.record_overall(tick.distance);

        match self.state {
            NavState::Greedy => self.greedy_step(&tick, true),
            NavState::Tracing(_) => self.trace_step(&tick),
            NavState::Idle => None,
        }
    }

    /// Undoes the latest [`step`](Self::step) after the executor refused its
    /// move. The next step under the same conditions returns the same
    /// direction.
    pub fn reject_move(&mut self) {
        let Some(checkpoint) = self.checkpoint.take() else {
            return;
        };
        let Checkpoint {
            mode,
            parked,
            progress,
            history,
            nonce,
        } = checkpoint;

        let current = std::mem::take(&mut self.state);
        self.state = match mode {
            ModeMark::Greedy => {
                if let NavState::Tracing(ctx) = current {
                    self.spare_guard = Some(ctx.into_guard());
                }
                NavState::Greedy
            }
            ModeMark::Tracing(marker) => {
                let ctx = match current {
                    NavState::Tracing(ctx) => Some(ctx),
                    _ => parked,
                };
                match ctx {
                    Some(mut ctx) => {
                        ctx.rewind(marker);
                        NavState::Tracing(ctx)
                    }
                    None => NavState::Greedy,
                }
            }
        };
        self.progress = progress;
        self.history = history;
        self.tie_break.rewind(nonce);
        tracing::debug!("move rejected, rolled back to {} mode", self.state.mode());
    }

    /// Runs one full tick against a world that both senses and moves.
    pub fn drive<W>(&mut self, world: &mut W, target: Position) -> StepOutcome
    where
        W: SensingOracle + MoveExecutor + ?Sized,
    {
        match self.step(&*world, target) {
            Some(direction) => {
                if world.try_move(direction) {
                    StepOutcome::Moved(direction)
                } else {
                    self.reject_move();
                    StepOutcome::Rejected(direction)
                }
            }
            None if world.position() == target => StepOutcome::Arrived,
            None if self.is_exhausted() => StepOutcome::Exhausted,
            None => StepOutcome::Blocked,
        }
    }

    pub fn mode(&self) -> NavMode {
        self.state.mode()
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    /// Active trace session, if tracing.
    pub fn trace(&self) -> Option<&TraceContext> {
        match &self.state {
            NavState::Tracing(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Whether the navigator gave up on its current target.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, NavState::Idle) && self.target.is_some()
    }

    /// Loop strikes since the last overall improvement.
    pub fn strikes(&self) -> u32 {
        self.progress.strikes
    }

    fn greedy_step(&mut self, tick: &Tick, may_trace: bool) -> Option<Direction> {
        let choice = greedy::select(
            &tick.neighborhood,
            tick.target,
            self.history.as_slice(),
            tick.lean,
        );
        let stalled = self
            .progress
            .record_greedy(tick.distance, self.config.stall_threshold);

        if !stalled {
            if let GreedyChoice::Progress(direction) = choice {
                return Some(direction);
            }
        }

        if may_trace {
            if stalled {
                tracing::debug!(
                    "greedy stalled for {} steps at {}",
                    self.progress.stalled,
                    tick.neighborhood.origin()
                );
            }
            if let Some(direction) = self.begin_trace(tick) {
                return Some(direction);
            }
        }

        choice.direction()
    }

    fn begin_trace(&mut self, tick: &Tick) -> Option<Direction> {
        let guard = match self.spare_guard.take() {
            Some(guard) if guard.dimensions() == tick.dims => guard,
            _ => match CycleGuard::for_board(tick.dims) {
                Ok(guard) => guard,
                Err(err) => {
                    tracing::warn!("cannot trace on this board ({}): {}", err.error_code(), err);
                    return None;
                }
            },
        };

        let mut ctx = TraceContext::enter(&tick.neighborhood, tick.target, guard, tick.lean)?;
        match ctx.advance(
            &tick.neighborhood,
            tick.target,
            self.history.as_slice(),
            tick.lean,
        ) {
            TraceStep::Move(direction) => {
                tracing::debug!(
                    "tracing from {} with the obstacle on the {} hand",
                    tick.neighborhood.origin(),
                    ctx.hand()
                );
                self.state = NavState::Tracing(ctx);
                Some(direction)
            }
            _ => {
                self.spare_guard = Some(ctx.into_guard());
                None
            }
        }
    }

    fn trace_step(&mut self, tick: &Tick) -> Option<Direction> {
        let outcome = match &mut self.state {
            NavState::Tracing(ctx) => ctx.advance(
                &tick.neighborhood,
                tick.target,
                self.history.as_slice(),
                tick.lean,
            ),
            _ => return None,
        };

        match outcome {
            TraceStep::Move(direction) => Some(direction),
            TraceStep::Blocked => None,
            TraceStep::Escaped => {
                tracing::debug!(
                    "trace escaped at {} (distance {})",
                    tick.neighborhood.origin(),
                    tick.distance
                );
                self.leave_trace();
                self.greedy_step(tick, false)
            }
            TraceStep::Looped(reason) => {
                self.leave_trace();
                self.progress.strikes += 1;
                if self.progress.strikes >= self.config.max_loop_strikes {
                    tracing::warn!(
                        "giving up on {} after {} looped traces",
                        tick.target,
                        self.progress.strikes
                    );
                    self.state = NavState::Idle;
                    return None;
                }
                tracing::debug!(
                    "trace abandoned at {} ({}), strike {}",
                    tick.neighborhood.origin(),
                    reason,
                    self.progress.strikes
                );
                self.greedy_step(tick, false)
            }
        }
    }

    /// Switches to greedy, parking the finished trace for a possible rollback.
    fn leave_trace(&mut self) {
        let previous = std::mem::replace(&mut self.state, NavState::Greedy);
        if let (NavState::Tracing(ctx), Some(checkpoint)) = (previous, self.checkpoint.as_mut()) {
            checkpoint.parked = Some(ctx);
        }
        self.progress.restart_greedy();
    }

    fn capture(&self) -> Checkpoint {
        let mode = match &self.state {
            NavState::Tracing(ctx) => ModeMark::Tracing(ctx.marker()),
            _ => ModeMark::Greedy,
        };
        Checkpoint {
            mode,
            parked: None,
            progress: self.progress,
            history: self.history.clone(),
            nonce: self.tie_break.nonce(),
        }
    }

    /// The previous move went through; recycle whatever it parked.
    fn settle_checkpoint(&mut self) {
        if let Some(ctx) = self.checkpoint.take().and_then(|checkpoint| checkpoint.parked) {
            self.spare_guard = Some(ctx.into_guard());
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}
