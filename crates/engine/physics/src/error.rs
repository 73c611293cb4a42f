//! Error types for the physics crate

use thiserror::Error;

/// Result type alias for physics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading collision data
#[derive(Debug, Error)]
pub enum Error {
    /// Input ended before a complete record was read
    #[error("Truncated data: expected {expected_bytes} bytes, {available_bytes} available")]
    Truncated {
        expected_bytes: usize,
        available_bytes: usize,
    },

    /// Input was structurally invalid
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

impl From<logic::Error> for Error {
    fn from(err: logic::Error) -> Self {
        match err {
            logic::Error::Truncated {
                expected_bytes,
                available_bytes,
            } => Error::Truncated {
                expected_bytes,
                available_bytes,
            },
            logic::Error::CorruptData(message) => Error::CorruptData(message),
            other => Error::CorruptData(other.to_string()),
        }
    }
}
