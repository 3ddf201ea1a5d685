//! Error types for the store collaborators.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by question, response, roster and template stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The addressed record does not exist (deleted concurrently or never created).
    #[error("not found: {0}")]
    NotFound(String),

    /// The write was based on a stale snapshot or violates a storage constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store could not be reached; the caller may retry.
    #[error("store unavailable: {0}")]
    TransientUnavailable(String),
}

impl Error {
    /// Only transient failures are eligible for a caller-controlled retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientUnavailable(_))
    }
}
