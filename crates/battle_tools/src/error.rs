//! Error types for the command-line tools.

use std::path::PathBuf;

use battle_core::error::BattleError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised while loading files or running the engine from the CLI.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read or written.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A report could not be serialized.
    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),

    /// Validation or engine error.
    #[error(transparent)]
    Battle(#[from] BattleError),
}

impl ToolError {
    /// Wrap an IO error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
