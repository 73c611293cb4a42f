//! Error types for the world crate

use thiserror::Error;

/// Result type alias for world operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running maps
#[derive(Debug, Error)]
pub enum Error {
    /// Rule loading or action registry error
    #[error(transparent)]
    Logic(#[from] logic::Error),

    /// Collision data error
    #[error(transparent)]
    Physics(#[from] physics::Error),

    /// Resource slot error
    #[error(transparent)]
    Pool(#[from] pool::Error),

    /// Unusable engine configuration
    #[error(transparent)]
    Config(#[from] system::ConfigError),
}
