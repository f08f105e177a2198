use crate::error::ConfigError;

/// Navigator tuning knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Recently occupied cells the greedy fallback avoids re-entering.
    pub history_len: usize,

    /// Greedy calls without a new best distance before tracing is forced.
    pub stall_threshold: u32,

    /// Looped traces, without overall progress in between, before the
    /// navigator gives up on the current target.
    pub max_loop_strikes: u32,

    /// Seed for tie-breaking between mirror-image choices.
    pub seed: u64,
}

impl NavConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_HISTORY: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HISTORY_LEN: usize = Self::MAX_HISTORY;
    pub const DEFAULT_STALL_THRESHOLD: u32 = 5;
    pub const DEFAULT_MAX_LOOP_STRIKES: u32 = 2;

    pub fn new() -> Self {
        Self {
            history_len: Self::DEFAULT_HISTORY_LEN,
            stall_threshold: Self::DEFAULT_STALL_THRESHOLD,
            max_loop_strikes: Self::DEFAULT_MAX_LOOP_STRIKES,
            seed: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::new()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=Self::MAX_HISTORY).contains(&self.history_len) {
            return Err(ConfigError::HistoryLength {
                len: self.history_len,
                max: Self::MAX_HISTORY,
            });
        }
        if self.stall_threshold == 0 {
            return Err(ConfigError::ZeroStallThreshold);
        }
        if self.max_loop_strikes == 0 {
            return Err(ConfigError::ZeroLoopStrikes);
        }
        Ok(())
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self::new()
    }
}
