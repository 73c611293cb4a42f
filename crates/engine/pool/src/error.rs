//! Error types for the pool crate

use thiserror::Error;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when handing slots back to a pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Handle does not refer to a slot of this pool
    #[error("Unknown slot {handle} (pool holds {len} slots)")]
    UnknownSlot { handle: u32, len: usize },

    /// Slot was released while not in use
    #[error("Slot {0} is not in use")]
    NotInUse(u32),
}
