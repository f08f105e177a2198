//! Cycle guard for obstacle tracing.
//!
//! Records every `(position, heading, hand)` configuration seen during one
//! trace session. Because the board is finite, the set of configurations is
//! finite too, so a trace that keeps producing new keys must eventually stop
//! and one that repeats a key is abandoned.
//!
//! The key packs `y`, `x`, a 3-bit heading and a 1-bit hand. Coordinate fields
//! are exactly as wide as the board needs, so no two on-board positions alias.

use std::collections::HashSet;

use crate::error::GuardError;
use crate::grid::{Direction, Hand, MapDimensions, Position};

/// Packed trace configuration.
pub type GuardKey = u64;

const HEADING_BITS: u32 = 3;
const HAND_BITS: u32 = 1;
const STATE_BITS: u32 = HEADING_BITS + HAND_BITS;

/// Key spaces up to this many bits use a dense bitset (2 MiB at the limit).
const DENSE_LIMIT_BITS: u32 = 24;

#[derive(Clone, Debug)]
enum Visited {
    Dense {
        words: Vec<u64>,
        /// Word indices written since the last clear.
        touched: Vec<usize>,
    },
    Sparse(HashSet<GuardKey>),
}

#[derive(Clone, Debug)]
pub struct CycleGuard {
    dims: MapDimensions,
    x_bits: u32,
    y_bits: u32,
    visited: Visited,
    recorded: usize,
}

impl CycleGuard {
    /// Builds a guard whose key space covers every on-board configuration.
    pub fn for_board(dims: MapDimensions) -> Result<Self, GuardError> {
        if dims.area() == 0 {
            return Err(GuardError::EmptyBoard(dims));
        }

        let x_bits = bits_for(dims.width);
        let y_bits = bits_for(dims.height);
        let key_bits = x_bits + y_bits + STATE_BITS;
        if key_bits > GuardKey::BITS {
            return Err(GuardError::KeySpaceOverflow {
                dims,
                bits: key_bits,
            });
        }

        let visited = if key_bits <= DENSE_LIMIT_BITS {
            let words = (1usize << key_bits).div_ceil(64);
            Visited::Dense {
                words: vec![0; words],
                touched: Vec::new(),
            }
        } else {
            Visited::Sparse(HashSet::new())
        };

        Ok(Self {
            dims,
            x_bits,
            y_bits,
            visited,
            recorded: 0,
        })
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dims
    }

    /// Width of the packed key for this board.
    pub fn key_bits(&self) -> u32 {
        self.x_bits + self.y_bits + STATE_BITS
    }

    /// Packs a configuration. `None` for off-board positions.
    pub fn key(&self, position: Position, heading: Direction, hand: Hand) -> Option<GuardKey> {
        if !self.dims.contains(position) {
            return None;
        }
        let cell = ((position.y as u64) << self.x_bits) | position.x as u64;
        Some((cell << STATE_BITS) | ((heading.index() as u64) << HAND_BITS) | hand.bit())
    }

    /// Records `key`. Returns `true` if it was new, `false` on a repeat.
    pub fn observe(&mut self, key: GuardKey) -> bool {
        let fresh = match &mut self.visited {
            Visited::Dense { words, touched } => {
                let (index, mask) = locate(key);
                match words.get_mut(index) {
                    Some(word) if *word & mask == 0 => {
                        if *word == 0 {
                            touched.push(index);
                        }
                        *word |= mask;
                        true
                    }
                    Some(_) => false,
                    None => false,
                }
            }
            Visited::Sparse(set) => set.insert(key),
        };
        if fresh {
            self.recorded += 1;
        }
        fresh
    }

    /// Removes a key recorded by the latest [`observe`](Self::observe).
    pub fn forget(&mut self, key: GuardKey) {
        let removed = match &mut self.visited {
            Visited::Dense { words, .. } => {
                let (index, mask) = locate(key);
                match words.get_mut(index) {
                    Some(word) if *word & mask != 0 => {
                        *word &= !mask;
                        true
                    }
                    _ => false,
                }
            }
            Visited::Sparse(set) => set.remove(&key),
        };
        if removed {
            self.recorded -= 1;
        }
    }

    pub fn contains(&self, key: GuardKey) -> bool {
        match &self.visited {
            Visited::Dense { words, .. } => {
                let (index, mask) = locate(key);
                words.get(index).is_some_and(|word| word & mask != 0)
            }
            Visited::Sparse(set) => set.contains(&key),
        }
    }

    pub fn clear(&mut self) {
        match &mut self.visited {
            Visited::Dense { words, touched } => {
                for index in touched.drain(..) {
                    words[index] = 0;
                }
            }
            Visited::Sparse(set) => set.clear(),
        }
        self.recorded = 0;
    }

    pub fn len(&self) -> usize {
        self.recorded
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    pub fn is_dense(&self) -> bool {
        matches!(self.visited, Visited::Dense { .. })
    }
}

#[inline]
fn locate(key: GuardKey) -> (usize, u64) {
    ((key >> 6) as usize, 1u64 << (key & 63))
}

/// Bits needed to index `0..extent`.
fn bits_for(extent: u32) -> u32 {
    if extent <= 1 {
        0
    } else {
        u32::BITS - (extent - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_width_follows_board_size() {
        let small = CycleGuard::for_board(MapDimensions::new(10, 10)).unwrap();
        assert_eq!(small.key_bits(), 4 + 4 + 4);
        assert!(small.is_dense());

        let square = CycleGuard::for_board(MapDimensions::new(64, 64)).unwrap();
        assert_eq!(square.key_bits(), 6 + 6 + 4);

        let wide = CycleGuard::for_board(MapDimensions::new(65, 1)).unwrap();
        assert_eq!(wide.key_bits(), 7 + 4);

        let huge = CycleGuard::for_board(MapDimensions::new(100_000, 100_000)).unwrap();
        assert_eq!(huge.key_bits(), 17 + 17 + 4);
        assert!(!huge.is_dense());
    }

    #[test]
    fn large_boards_do_not_alias_coordinates() {
        let mut guard = CycleGuard::for_board(MapDimensions::new(200, 200)).unwrap();
        let a = guard
            .key(Position::new(3, 0), Direction::North, Hand::Left)
            .unwrap();
        let b = guard
            .key(Position::new(67, 0), Direction::North, Hand::Left)
            .unwrap();
        let c = guard
            .key(Position::new(3, 64), Direction::North, Hand::Left)
            .unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);

        assert!(guard.observe(a));
        assert!(guard.observe(b));
        assert!(guard.observe(c));
        assert!(!guard.observe(a));
        assert_eq!(guard.len(), 3);
    }

    #[test]
    fn heading_and_hand_are_part_of_the_key() {
        let guard = CycleGuard::for_board(MapDimensions::new(8, 8)).unwrap();
        let position = Position::new(4, 4);
        let base = guard.key(position, Direction::East, Hand::Left);
        assert_ne!(base, guard.key(position, Direction::West, Hand::Left));
        assert_ne!(base, guard.key(position, Direction::East, Hand::Right));
        assert_eq!(guard.key(Position::new(8, 0), Direction::East, Hand::Left), None);
    }

    #[test]
    fn forget_and_clear_reset_membership() {
        let mut guard = CycleGuard::for_board(MapDimensions::new(16, 16)).unwrap();
        let key = guard
            .key(Position::new(5, 9), Direction::South, Hand::Right)
            .unwrap();

        assert!(guard.observe(key));
        guard.forget(key);
        assert!(!guard.contains(key));
        assert!(guard.observe(key));

        guard.clear();
        assert!(guard.is_empty());
        assert!(guard.observe(key));
    }

    #[test]
    fn sparse_storage_behaves_like_dense() {
        let mut guard = CycleGuard::for_board(MapDimensions::new(5000, 5000)).unwrap();
        assert!(!guard.is_dense());
        let key = guard
            .key(Position::new(4999, 4999), Direction::NorthWest, Hand::Right)
            .unwrap();
        assert!(guard.observe(key));
        assert!(!guard.observe(key));
        guard.forget(key);
        assert!(guard.observe(key));
        guard.clear();
        assert!(guard.is_empty());
    }

    #[test]
    fn rejects_degenerate_boards() {
        assert_eq!(
            CycleGuard::for_board(MapDimensions::new(0, 4)).unwrap_err(),
            GuardError::EmptyBoard(MapDimensions::new(0, 4))
        );
        let err = CycleGuard::for_board(MapDimensions::new(u32::MAX, u32::MAX)).unwrap_err();
        assert!(matches!(err, GuardError::KeySpaceOverflow { bits: 68, .. }));
    }
}
