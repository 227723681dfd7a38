//! Error types shared across the project-memory crates.

use thiserror::Error;

/// Errors raised while loading shared configuration.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
