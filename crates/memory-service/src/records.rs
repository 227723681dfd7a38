//! Record builder for collaborators.
//!
//! Memory, diary and rule-discovery components describe what they want to
//! store with a [`NewRecord`]; this module assigns identity and time and
//! hands the resulting [`Document`] to the project's index.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use ulid::Ulid;

use memory_types::{DocType, Document, DocumentMetadata, Priority};

use crate::error::ServiceError;
use crate::registry::IndexRegistry;

/// Default `source` for records that do not name one.
pub const DEFAULT_SOURCE: &str = "manual";

/// A document that has not been assigned an id or scope yet.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub doc_type: DocType,
    pub content: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub category: String,
    pub source: String,
    pub title: Option<String>,
    /// Event time; `None` means now
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewRecord {
    pub fn new(doc_type: DocType, content: impl Into<String>) -> Self {
        Self {
            doc_type,
            content: content.into(),
            tags: Vec::new(),
            priority: Priority::default(),
            category: String::new(),
            source: DEFAULT_SOURCE.to_string(),
            title: None,
            timestamp: None,
        }
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::new(DocType::Note, content)
    }

    pub fn decision(content: impl Into<String>) -> Self {
        Self::new(DocType::Decision, content)
    }

    pub fn rule(content: impl Into<String>) -> Self {
        Self::new(DocType::Rule, content)
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build a document for `scope` with a fresh ULID.
    pub fn into_document(self, scope: &str) -> Document {
        Document {
            id: Ulid::new().to_string(),
            doc_type: self.doc_type,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            content: self.content,
            tags: normalize_tags(self.tags),
            metadata: DocumentMetadata {
                project_scope: scope.to_string(),
                source: self.source,
                priority: self.priority,
                category: self.category.trim().to_string(),
                title: self.title.filter(|t| !t.trim().is_empty()),
            },
        }
    }
}

/// Trim tags, drop empty ones and keep the first of any case-insensitive duplicates.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

impl IndexRegistry {
    /// Build a document from `record` and insert it into the project's index.
    pub fn remember(
        &self,
        root: impl AsRef<Path>,
        record: NewRecord,
    ) -> Result<Document, ServiceError> {
        self.with_project_mut(root, |project| {
            let doc = record.into_document(project.scope());
            project.insert(doc.clone())?;
            Ok(doc)
        })
    }
}
