//! Common error infrastructure for nav-core.
//!
//! Navigation itself is total: a blocked agent is signalled by returning
//! `None`, never by an error. The error types here cover construction-time
//! problems (an invalid configuration, a board too large to key) so callers
//! can reject them up front.

use crate::grid::MapDimensions;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying later may succeed.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,

    /// Navigation cannot continue.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all nav-core errors.
pub trait NavError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for the variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Rejected [`NavConfig`](crate::NavConfig) values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigError {
    #[error("history length {len} must be within 1..={max}")]
    HistoryLength { len: usize, max: usize },

    #[error("stall threshold must be at least 1")]
    ZeroStallThreshold,

    #[error("loop strike limit must be at least 1")]
    ZeroLoopStrikes,
}

impl NavError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::HistoryLength { .. } => "CONFIG_HISTORY_LENGTH",
            ConfigError::ZeroStallThreshold => "CONFIG_ZERO_STALL_THRESHOLD",
            ConfigError::ZeroLoopStrikes => "CONFIG_ZERO_LOOP_STRIKES",
        }
    }
}

/// Failures building a [`CycleGuard`](crate::CycleGuard).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuardError {
    #[error("board {dims:?} needs a {bits}-bit trace key, more than 64")]
    KeySpaceOverflow { dims: MapDimensions, bits: u32 },

    #[error("board {0:?} has no cells")]
    EmptyBoard(MapDimensions),
}

impl NavError for GuardError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // Tracing degrades to greedy-only movement on such boards.
            GuardError::KeySpaceOverflow { .. } => ErrorSeverity::Recoverable,
            GuardError::EmptyBoard(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            GuardError::KeySpaceOverflow { .. } => "GUARD_KEY_SPACE_OVERFLOW",
            GuardError::EmptyBoard(_) => "GUARD_EMPTY_BOARD",
        }
    }
}
