//! Storage layer for the project-memory search engine.
//!
//! Provides:
//! - [`DocumentStore`]: the authoritative id -> document map of a project
//! - [`SnapshotFile`]: whole-store JSON snapshots with atomic replace

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::StorageError;
pub use snapshot::{Snapshot, SnapshotFile, SNAPSHOT_VERSION};
pub use store::DocumentStore;
