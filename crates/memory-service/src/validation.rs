//! Document validation.
//!
//! Runs before any store or index mutation; a rejected document leaves both
//! untouched.

use std::collections::HashSet;

use thiserror::Error;

use memory_types::Document;

/// Named reasons a document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document id must not be empty")]
    EmptyId,

    #[error("document {0} has empty content")]
    EmptyContent(String),

    #[error("document {0} has an empty project scope")]
    EmptyProjectScope(String),

    #[error("document project scope {found:?} does not match index scope {expected:?}")]
    ScopeMismatch { expected: String, found: String },

    #[error("document {0} has an empty tag")]
    EmptyTag(String),

    #[error("duplicate tag (case-insensitive): {0}")]
    DuplicateTag(String),
}

/// Validate a document on its own.
pub fn validate_document(doc: &Document) -> Result<(), ValidationError> {
    if doc.id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if doc.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent(doc.id.clone()));
    }
    if doc.metadata.project_scope.trim().is_empty() {
        return Err(ValidationError::EmptyProjectScope(doc.id.clone()));
    }

    let mut seen = HashSet::with_capacity(doc.tags.len());
    for tag in &doc.tags {
        let normalized = tag.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyTag(doc.id.clone()));
        }
        if !seen.insert(normalized) {
            return Err(ValidationError::DuplicateTag(tag.clone()));
        }
    }

    Ok(())
}

/// Validate a document destined for the index of `scope`.
pub fn validate_for_scope(doc: &Document, scope: &str) -> Result<(), ValidationError> {
    validate_document(doc)?;
    if doc.metadata.project_scope != scope {
        return Err(ValidationError::ScopeMismatch {
            expected: scope.to_string(),
            found: doc.metadata.project_scope.clone(),
        });
    }
    Ok(())
}
