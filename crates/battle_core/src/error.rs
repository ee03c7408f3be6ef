//! Error types for validation, engine runs and protocol decoding.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for every battle engine operation.
///
/// The first four variants are pre-flight failures: they are raised before any
/// engine process is started and are fixed by correcting the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The attribute table violates one of its invariants.
    #[error("Invalid unit attributes: {0}")]
    InvalidAttributes(String),

    /// A side is too large or references an unknown unit kind.
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    /// A combatant was constructed with out-of-range values.
    #[error("Invalid combatant: {0}")]
    InvalidCombatant(String),

    /// The requested seed cannot be passed to the engine.
    #[error("Invalid seed {0}: must be between 0 and {max}", max = u32::MAX)]
    InvalidSeed(i64),

    /// The engine did not finish in time and was killed.
    #[error("Engine timed out after {timeout:?}")]
    EngineTimeout {
        /// Time limit that elapsed.
        timeout: Duration,
    },

    /// The engine exited with a nonzero status or could not be run at all.
    #[error("Engine failed{}: {message}", .status.map(|s| format!(" with status {s}")).unwrap_or_default())]
    EngineFailure {
        /// Exit code, `None` if the process never ran or was terminated by a signal.
        status: Option<i32>,
        /// Diagnostic output of the engine, verbatim.
        message: String,
    },

    /// The engine exited successfully but its output has the wrong shape.
    #[error("Malformed engine output: {0}")]
    MalformedOutput(String),
}

/// Fieldless discriminant of [`BattleError`], for branching on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`BattleError::InvalidAttributes`].
    InvalidAttributes,
    /// See [`BattleError::InvalidRoster`].
    InvalidRoster,
    /// See [`BattleError::InvalidCombatant`].
    InvalidCombatant,
    /// See [`BattleError::InvalidSeed`].
    InvalidSeed,
    /// See [`BattleError::EngineTimeout`].
    EngineTimeout,
    /// See [`BattleError::EngineFailure`].
    EngineFailure,
    /// See [`BattleError::MalformedOutput`].
    MalformedOutput,
}

impl ErrorKind {
    /// Whether the failure never reached the engine process.
    pub fn is_preflight(self) -> bool {
        matches!(
            self,
            Self::InvalidAttributes | Self::InvalidRoster | Self::InvalidCombatant | Self::InvalidSeed
        )
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only timeouts qualify; the client never retries on its own.
    pub fn is_retryable(self) -> bool {
        self == Self::EngineTimeout
    }
}

impl BattleError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAttributes(_) => ErrorKind::InvalidAttributes,
            Self::InvalidRoster(_) => ErrorKind::InvalidRoster,
            Self::InvalidCombatant(_) => ErrorKind::InvalidCombatant,
            Self::InvalidSeed(_) => ErrorKind::InvalidSeed,
            Self::EngineTimeout { .. } => ErrorKind::EngineTimeout,
            Self::EngineFailure { .. } => ErrorKind::EngineFailure,
            Self::MalformedOutput(_) => ErrorKind::MalformedOutput,
        }
    }

    /// Build an [`BattleError::EngineFailure`] for a process that could not be run.
    pub fn engine_io(context: &str, err: &std::io::Error) -> Self {
        Self::EngineFailure {
            status: None,
            message: format!("{context}: {err}"),
        }
    }
}
