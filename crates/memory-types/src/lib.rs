//! # memory-types
//!
//! Shared domain types for the project-memory search engine.
//!
//! - [`Document`]: the unit of storage and retrieval
//! - [`DocType`], [`Priority`]: closed enums used as filter axes
//! - [`DocumentSource`]: read access to a set of documents
//! - [`Settings`]: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use memory_types::{DocType, Document, Priority};
//!
//! let doc = Document::new("m1", DocType::Note, Utc::now(), "Use anyhow in binaries", "/work/app")
//!     .with_tags(["errors"])
//!     .with_priority(Priority::High);
//! assert_eq!(doc.project_scope(), "/work/app");
//! ```

pub mod config;
pub mod document;
pub mod error;

pub use config::Settings;
pub use document::{DocType, Document, DocumentMetadata, DocumentSource, Priority};
pub use error::MemoryError;
