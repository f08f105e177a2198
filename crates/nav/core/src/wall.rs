//! Obstacle tracing.
//!
//! Once greedy movement stops making progress the agent keeps the obstacle on
//! one hand and walks its perimeter. Every step sweeps from the heading that
//! points at the obstacle reference cell, rotating away from the obstacle
//! side until a legal cell turns up. Unsafe cells are passed over like blocked
//! ones unless nothing safe is open. The last blocked cell passed by the sweep
//! becomes the new reference, so the trace keeps hugging the nearest surface.
//!
//! The trace ends when:
//! - the agent is closer than it was at contact and greedy can progress again
//!   ([`TraceStep::Escaped`]),
//! - it returns to the cell where its current lap started
//!   ([`LoopReason::Revisit`]),
//! - or the [`CycleGuard`] sees a configuration twice ([`LoopReason::Cycle`]).

use crate::greedy;
use crate::grid::{Direction, Hand, Position};
use crate::guard::{CycleGuard, GuardKey};
use crate::sensing::Neighborhood;

/// Why a trace was abandoned without escaping.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LoopReason {
    /// Came back to the lap anchor without getting any closer.
    Revisit,
    /// Repeated a `(position, heading, hand)` configuration.
    Cycle,
}

/// Result of one tracing tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStep {
    Move(Direction),
    /// Closer than at contact and direct progress is possible again.
    Escaped,
    Looped(LoopReason),
    /// No legal neighbor this tick.
    Blocked,
}

/// Scalar trace fields, captured so a rejected move can be undone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TraceMarker {
    hand: Hand,
    obstacle: Position,
    best_distance: i64,
    best_location: Position,
    lap_anchor: Position,
    lap_start: u32,
    moves: u32,
}

/// State of one obstacle-tracing session.
#[derive(Clone, Debug)]
pub struct TraceContext {
    hand: Hand,
    obstacle: Position,
    contact: Position,
    contact_distance: i64,
    best_distance: i64,
    best_location: Position,
    /// Cell whose revisit ends the session: the latest improvement or hand flip.
    lap_anchor: Position,
    lap_start: u32,
    moves: u32,
    flips: u32,
    guard: CycleGuard,
    /// Key recorded during the current tick, forgotten on rollback.
    fresh_key: Option<GuardKey>,
}

struct Probe {
    direction: Direction,
    rotations: u8,
    obstacle: Position,
}

enum Sweep {
    Found {
        direction: Direction,
        blocked: Option<Position>,
    },
    HitBoundary,
    Exhausted,
}

impl TraceContext {
    /// Starts a trace at the agent's current cell.
    ///
    /// Probes both rotation senses from the direct heading for the first legal
    /// neighbor. The side whose candidate lands closer to the target wins; on a
    /// tie the candidate nearer the agent (an orthogonal step), then the one
    /// needing fewer rotations, then `lean`. Winning by rotating left keeps the
    /// obstacle on the right hand, and vice versa.
    ///
    /// Returns `None` if the agent is on the target or has no legal neighbor.
    pub fn enter(
        neighborhood: &Neighborhood,
        target: Position,
        mut guard: CycleGuard,
        lean: Hand,
    ) -> Option<Self> {
        let origin = neighborhood.origin();
        let heading = origin.direction_to(target)?;

        // `Hand::Right` sweeps left and `Hand::Left` sweeps right. Unsafe
        // cells are probed only when no safe one is open on either side.
        let (leftward, rightward) = match (
            probe(neighborhood, heading, Hand::Right, true),
            probe(neighborhood, heading, Hand::Left, true),
        ) {
            (None, None) => (
                probe(neighborhood, heading, Hand::Right, false),
                probe(neighborhood, heading, Hand::Left, false),
            ),
            found => found,
        };

        let (hand, winner) = match (leftward, rightward) {
            (None, None) => return None,
            (Some(left), None) => (Hand::Right, left),
            (None, Some(right)) => (Hand::Left, right),
            (Some(left), Some(right)) => {
                let rank = |probe: &Probe, preferred: bool| {
                    let destination = origin.step(probe.direction);
                    (
                        destination.distance_squared(target),
                        destination.distance_squared(origin),
                        probe.rotations,
                        u8::from(!preferred),
                    )
                };
                let left_rank = rank(&left, lean == Hand::Left);
                let right_rank = rank(&right, lean == Hand::Right);
                if left_rank <= right_rank {
                    (Hand::Right, left)
                } else {
                    (Hand::Left, right)
                }
            }
        };

        guard.clear();
        let contact_distance = origin.distance_squared(target);
        tracing::trace!(
            "trace probe picked {} (rotations {}) keeping obstacle {} on the {} hand",
            winner.direction,
            winner.rotations,
            winner.obstacle,
            hand
        );

        Some(Self {
            hand,
            obstacle: winner.obstacle,
            contact: origin,
            contact_distance,
            best_distance: contact_distance,
            best_location: origin,
            lap_anchor: origin,
            lap_start: 0,
            moves: 0,
            flips: 0,
            guard,
            fresh_key: None,
        })
    }

    /// Advances the trace by one tick.
    ///
    /// `history` and `lean` are only used to ask the greedy selector whether
    /// direct progress is available again.
    pub fn advance(
        &mut self,
        neighborhood: &Neighborhood,
        target: Position,
        history: &[Position],
        lean: Hand,
    ) -> TraceStep {
        self.fresh_key = None;
        let origin = neighborhood.origin();
        let distance = origin.distance_squared(target);

        if distance < self.best_distance {
            self.best_distance = distance;
            self.best_location = origin;
            self.restart_lap(origin);
        } else if origin == self.lap_anchor && self.moves > self.lap_start {
            return TraceStep::Looped(LoopReason::Revisit);
        }

        if distance < self.contact_distance
            && greedy::select(neighborhood, target, history, lean).is_progress()
        {
            return TraceStep::Escaped;
        }

        let Some(heading) = origin
            .direction_to(self.obstacle)
            .or_else(|| origin.direction_to(target))
        else {
            return TraceStep::Blocked;
        };

        match self.guard.key(origin, heading, self.hand) {
            Some(key) if self.guard.observe(key) => self.fresh_key = Some(key),
            _ => return TraceStep::Looped(LoopReason::Cycle),
        }

        self.sweep(neighborhood, heading)
    }

    fn sweep(&mut self, neighborhood: &Neighborhood, heading: Direction) -> TraceStep {
        let found = match self.rotate(neighborhood, heading, false, true) {
            Sweep::HitBoundary => {
                // The "obstacle" is the board edge; go around the other way.
                let flipped = self.hand.flipped();
                tracing::debug!(
                    "trace hit the board edge at {}, flipping hand {} -> {}",
                    neighborhood.origin(),
                    self.hand,
                    flipped
                );
                self.hand = flipped;
                self.flips += 1;
                self.restart_lap(neighborhood.origin());
                self.rotate(neighborhood, heading, true, true)
            }
            other => other,
        };
        let found = match found {
            Sweep::Exhausted => self.rotate(neighborhood, heading, true, false),
            other => other,
        };

        match found {
            Sweep::Found { direction, blocked } => {
                if let Some(cell) = blocked {
                    self.obstacle = cell;
                }
                self.moves += 1;
                TraceStep::Move(direction)
            }
            Sweep::HitBoundary | Sweep::Exhausted => TraceStep::Blocked,
        }
    }

    /// Rotates away from the obstacle side, at most one full turn.
    ///
    /// With `edge_is_wall` unset, an off-board probe seen before any open
    /// candidate aborts the sweep so the caller can flip hands. With
    /// `safe_only` set, unsafe cells are passed over like blocked ones.
    fn rotate(
        &self,
        neighborhood: &Neighborhood,
        heading: Direction,
        edge_is_wall: bool,
        safe_only: bool,
    ) -> Sweep {
        let origin = neighborhood.origin();
        let mut direction = heading;
        let mut blocked = None;

        for _ in 0..Direction::COUNT {
            if is_open(neighborhood, direction, safe_only) {
                return Sweep::Found { direction, blocked };
            }
            if neighborhood.is_on_board(direction) {
                blocked = Some(origin.step(direction));
            } else if !edge_is_wall {
                return Sweep::HitBoundary;
            }
            direction = self.hand.sweep(direction);
        }

        Sweep::Exhausted
    }

    fn restart_lap(&mut self, anchor: Position) {
        self.lap_anchor = anchor;
        self.lap_start = self.moves;
    }

    pub(crate) fn marker(&self) -> TraceMarker {
        TraceMarker {
            hand: self.hand,
            obstacle: self.obstacle,
            best_distance: self.best_distance,
            best_location: self.best_location,
            lap_anchor: self.lap_anchor,
            lap_start: self.lap_start,
            moves: self.moves,
        }
    }

    /// Restores the fields captured by `marker` and forgets this tick's key.
    pub(crate) fn rewind(&mut self, marker: TraceMarker) {
        if marker.hand != self.hand {
            self.flips = self.flips.saturating_sub(1);
        }
        self.hand = marker.hand;
        self.obstacle = marker.obstacle;
        self.best_distance = marker.best_distance;
        self.best_location = marker.best_location;
        self.lap_anchor = marker.lap_anchor;
        self.lap_start = marker.lap_start;
        self.moves = marker.moves;
        if let Some(key) = self.fresh_key.take() {
            self.guard.forget(key);
        }
    }

    /// Hands the guard back for reuse by a later trace.
    pub(crate) fn into_guard(self) -> CycleGuard {
        self.guard
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Obstacle reference cell anchoring the sweep heading.
    pub fn obstacle(&self) -> Position {
        self.obstacle
    }

    /// Where the agent first touched the obstacle.
    pub fn contact(&self) -> Position {
        self.contact
    }

    pub fn contact_distance(&self) -> i64 {
        self.contact_distance
    }

    pub fn best_distance(&self) -> i64 {
        self.best_distance
    }

    pub fn best_location(&self) -> Position {
        self.best_location
    }

    /// Moves issued since the trace began.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Hand flips caused by the board edge.
    pub fn flips(&self) -> u32 {
        self.flips
    }

    pub fn guard(&self) -> &CycleGuard {
        &self.guard
    }
}

fn is_open(neighborhood: &Neighborhood, direction: Direction, safe_only: bool) -> bool {
    if safe_only {
        neighborhood.is_safe_legal(direction)
    } else {
        neighborhood.is_legal(direction)
    }
}

/// Finds the first open neighbor rotating from `heading` with `hand`'s sweep.
/// Off-board cells count as blocked but never become the obstacle reference.
fn probe(
    neighborhood: &Neighborhood,
    heading: Direction,
    hand: Hand,
    safe_only: bool,
) -> Option<Probe> {
    let origin = neighborhood.origin();
    let mut direction = heading;
    let mut obstacle = None;

    for rotations in 0..Direction::COUNT as u8 {
        if is_open(neighborhood, direction, safe_only) {
            return Some(Probe {
                direction,
                rotations,
                obstacle: obstacle.unwrap_or_else(|| origin.step(heading)),
            });
        }
        if neighborhood.is_on_board(direction) {
            obstacle = Some(origin.step(direction));
        }
        direction = hand.sweep(direction);
    }

    None
}
