//! Seeded tie-breaking.
//!
//! Mirror-image choices (equal distance on either side of the heading) are
//! settled by a coin derived from the caller's seed and a per-call nonce. No
//! wall-clock or OS entropy is involved, so a replay with the same seed and
//! the same sensed inputs yields the same directions.

use crate::grid::Hand;

/// PCG-XSH-RR: 32-bit output from 64-bit state.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the base seed with a nonce and a context value into a single seed.
pub fn compute_seed(base_seed: u64, nonce: u64, context: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Per-navigator coin source. One draw per navigator step.
#[derive(Clone, Copy, Debug)]
pub struct TieBreaker {
    seed: u64,
    nonce: u64,
    rng: PcgRng,
}

impl TieBreaker {
    const LEAN_CONTEXT: u32 = 0;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            rng: PcgRng,
        }
    }

    /// Draws the rotation side preferred for this step's mirror ties.
    pub fn lean(&mut self) -> Hand {
        self.nonce = self.nonce.wrapping_add(1);
        let roll = self
            .rng
            .next_u32(compute_seed(self.seed, self.nonce, Self::LEAN_CONTEXT));
        if roll & 1 == 0 { Hand::Left } else { Hand::Right }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub(crate) fn rewind(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    pub(crate) fn restart(&mut self) {
        self.nonce = 0;
    }
}
