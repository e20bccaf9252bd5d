//! Error types for the noughts crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the noughts crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: ({x}, {y}) is out of range or already occupied")]
    InvalidMove { x: usize, y: usize },

    #[error("action index {action} is out of bounds (must be 0-8)")]
    InvalidAction { action: usize },

    #[error("board encoding too short: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("invalid hyperparameter {name}={value}: {reason}")]
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("failed to {operation} {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed policy snapshot at byte {offset}: {reason}")]
    MalformedSnapshot { offset: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Error::MalformedSnapshot {
            offset,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_snapshot_display() {
        let err = Error::malformed(8, "key length 40 exceeds remaining 3 bytes");
        assert_eq!(
            err.to_string(),
            "malformed policy snapshot at byte 8: key length 40 exceeds remaining 3 bytes"
        );
    }

    #[test]
    fn test_invalid_move_display() {
        let err = Error::InvalidMove { x: 3, y: 0 };
        assert!(err.to_string().contains("(3, 0)"));
    }
}
