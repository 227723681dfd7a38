//! Storage layer error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while writing a snapshot
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot exists but cannot be read back
    #[error("Corrupt snapshot at {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
