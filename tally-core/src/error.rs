//! Error types for tally-core

use thiserror::Error;

use crate::storage;
use crate::validation::ValidationResult;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the editing, submission and results controllers.
#[derive(Debug, Error)]
pub enum Error {
    /// Field-level violations; the operation was not applied.
    #[error("validation failed: {0}")]
    Validation(ValidationResult),

    /// The operation conflicts with existing state (type change after
    /// responses, stale snapshot, frozen response). Refetch and retry.
    #[error("structural conflict: {0}")]
    StructuralConflict(String),

    /// A question, response or template vanished or never existed.
    #[error("not found: {0}")]
    NotFound(String),

    /// A collaborator store is temporarily unavailable.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration or template catalogue could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// The violations carried by a validation error, if any.
    pub fn violations(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation(result) => Some(result),
            _ => None,
        }
    }
}

impl From<storage::Error> for Error {
    fn from(err: storage::Error) -> Self {
        match err {
            storage::Error::NotFound(what) => Self::NotFound(what),
            storage::Error::Conflict(what) => Self::StructuralConflict(what),
            storage::Error::TransientUnavailable(what) => Self::StoreUnavailable(what),
        }
    }
}

impl From<ValidationResult> for Error {
    fn from(result: ValidationResult) -> Self {
        Self::Validation(result)
    }
}
