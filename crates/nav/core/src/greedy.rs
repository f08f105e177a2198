//! Greedy step selection.
//!
//! Picks the locally best step toward the target from a sensed
//! [`Neighborhood`]. Pure: the same inputs always produce the same choice.

use crate::grid::{Direction, Hand, Position};
use crate::sensing::{CellFlags, Neighborhood};

/// Outcome of a greedy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GreedyChoice {
    /// A safe step that strictly reduces the distance to the target.
    Progress(Direction),
    /// A legal step that does not reduce the distance.
    Fallback(Direction),
    /// Every neighbor is illegal, or the agent already stands on the target.
    Blocked,
}

impl GreedyChoice {
    pub fn direction(self) -> Option<Direction> {
        match self {
            GreedyChoice::Progress(direction) | GreedyChoice::Fallback(direction) => {
                Some(direction)
            }
            GreedyChoice::Blocked => None,
        }
    }

    pub fn is_progress(self) -> bool {
        matches!(self, GreedyChoice::Progress(_))
    }
}

/// Selects the next greedy step.
///
/// Progress candidates are scored by `(distance², ownership rank)`; ties go to
/// the direction closest in rotation to the direct heading, then to the side
/// named by `lean`. Without a progress candidate the selector falls back to a
/// safe step outside `history`, then to any legal step at all.
pub fn select(
    neighborhood: &Neighborhood,
    target: Position,
    history: &[Position],
    lean: Hand,
) -> GreedyChoice {
    let origin = neighborhood.origin();
    let Some(heading) = origin.direction_to(target) else {
        return GreedyChoice::Blocked;
    };
    let current = origin.distance_squared(target);
    let ranker = Ranker {
        neighborhood,
        target,
        heading,
        lean,
    };

    if let Some(direction) = ranker.best(|flags, destination| {
        flags.is_safe_legal() && destination.distance_squared(target) < current
    }) {
        return GreedyChoice::Progress(direction);
    }

    if let Some(direction) =
        ranker.best(|flags, destination| flags.is_safe_legal() && !history.contains(&destination))
    {
        return GreedyChoice::Fallback(direction);
    }

    ranker
        .best(|flags, _| flags.is_legal())
        .map_or(GreedyChoice::Blocked, GreedyChoice::Fallback)
}

struct Ranker<'a> {
    neighborhood: &'a Neighborhood,
    target: Position,
    heading: Direction,
    lean: Hand,
}

impl Ranker<'_> {
    fn best(&self, admit: impl Fn(CellFlags, Position) -> bool) -> Option<Direction> {
        let origin = self.neighborhood.origin();
        Direction::ALL
            .into_iter()
            .filter(|&direction| admit(self.neighborhood.flags(direction), origin.step(direction)))
            .min_by_key(|&direction| self.score(direction))
    }

    fn score(&self, direction: Direction) -> (i64, u8, u8, u8) {
        let destination = self.neighborhood.origin().step(direction);
        let offset = direction.offset_from(self.heading);
        let off_lean = match self.lean {
            Hand::Left => u8::from(offset > 0),
            Hand::Right => u8::from(offset < 0),
        };
        (
            destination.distance_squared(self.target),
            self.neighborhood.ownership(direction).rank(),
            offset.unsigned_abs(),
            off_lean,
        )
    }
}
