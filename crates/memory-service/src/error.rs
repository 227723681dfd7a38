//! Service error types.

use std::path::PathBuf;

use thiserror::Error;

use memory_storage::StorageError;

use crate::validation::ValidationError;

/// Errors surfaced to callers of the project index and registry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No successful `initialize` for this project
    #[error("index not initialized for project: {0:?}")]
    NotInitialized(PathBuf),

    /// Document rejected before reaching the store
    #[error("Invalid document: {0}")]
    Validation(#[from] ValidationError),

    /// Snapshot could not be written or read; in-memory state is kept
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),

    /// A lock holder panicked
    #[error("Index lock poisoned: {0}")]
    LockPoisoned(String),
}

impl ServiceError {
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, ServiceError::NotInitialized(_))
    }
}
