//! Error types for the tilemind crate

use thiserror::Error;

/// Main error type for the tilemind crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid direction '{value}' (expected one of: up, down, left, right or 0-3)")]
    InvalidDirection { value: String },

    #[error("invalid tile {value} at row {row}, column {col} (must be 0 or a power of two from 2 to 131072)")]
    InvalidTile { row: usize, col: usize, value: u32 },

    #[error("board has wrong number of cells: expected {expected}, got {got}")]
    InvalidBoardLength { expected: usize, got: usize },

    #[error("invalid state key '{input}': {reason}")]
    InvalidStateKey { input: String, reason: String },

    #[error("failed to decode value table: {reason}")]
    Decode { reason: String },

    #[error("failed to encode value table: {message}")]
    Encode { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("{resource} lock poisoned by a panicking thread")]
    LockPoisoned { resource: String },

    #[error("training thread panicked")]
    TrainerPanicked,
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// True for errors raised while decoding a persisted value table.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}
