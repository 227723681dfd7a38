//! Project index service for project-memory.
//!
//! Provides:
//! - [`ProjectIndex`]: document store + inverted index + snapshot for one project
//! - [`IndexRegistry`]: project root -> index instance, with explicit initialize/clear
//! - Document validation ahead of every mutation
//! - [`NewRecord`]: id/time assignment for collaborator-built documents

pub mod error;
pub mod project;
pub mod records;
pub mod registry;
pub mod validation;

pub use error::ServiceError;
pub use project::{IndexStats, LoadOutcome, ProjectIndex};
pub use records::{normalize_tags, NewRecord};
pub use registry::{IndexRegistry, SharedProjectIndex};
pub use validation::{validate_document, validate_for_scope, ValidationError};
