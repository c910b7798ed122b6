//! Error types for the chain engine.

use babbler_store::StoreError;
use thiserror::Error;

/// Errors that can occur during engine operations.
///
/// An empty generation result is not an error; see
/// [`Generated`](crate::engine::Generated).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
