//! Document type for the per-project search index.
//!
//! Documents are the unit of storage and retrieval: notes, decisions,
//! rules and dependency records captured for a single project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of document, used as the primary filter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    /// Free-form note
    Note,
    /// Recorded decision
    Decision,
    /// Project rule or convention
    Rule,
    /// Dependency record (package, version, usage)
    Dependency,
}

impl DocType {
    /// All document kinds, in declaration order.
    pub const ALL: [DocType; 4] = [
        DocType::Note,
        DocType::Decision,
        DocType::Rule,
        DocType::Dependency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Note => "note",
            DocType::Decision => "decision",
            DocType::Rule => "rule",
            DocType::Dependency => "dependency",
        }
    }

    /// Parse from string, returning None for unknown types.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "note" => Some(DocType::Note),
            "decision" => Some(DocType::Decision),
            "rule" => Some(DocType::Rule),
            "dependency" => Some(DocType::Dependency),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown doc type: {}", s))
    }
}

/// Document priority. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown priority: {}", s))
    }
}

/// Fixed metadata record carried by every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Project the document belongs to. Never changes after insertion.
    pub project_scope: String,

    /// Where the document came from (tool name, "manual", ...)
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentMetadata {
    pub fn new(project_scope: impl Into<String>) -> Self {
        Self {
            project_scope: project_scope.into(),
            source: String::new(),
            priority: Priority::default(),
            category: String::new(),
            title: None,
        }
    }
}

/// A searchable document.
///
/// Updates replace the whole document; there are no partial-field patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier within the project scope
    pub id: String,

    pub doc_type: DocType,

    /// Creation or event time, used for sorting and range filters
    pub timestamp: DateTime<Utc>,

    /// Full text body
    pub content: String,

    /// Short labels, unique case-insensitively
    #[serde(default)]
    pub tags: Vec<String>,

    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new document with default metadata for the given scope.
    pub fn new(
        id: impl Into<String>,
        doc_type: DocType,
        timestamp: DateTime<Utc>,
        content: impl Into<String>,
        project_scope: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            doc_type,
            timestamp,
            content: content.into(),
            tags: Vec::new(),
            metadata: DocumentMetadata::new(project_scope),
        }
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
        self.metadata.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = category.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = source.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Project scope shortcut
    pub fn project_scope(&self) -> &str {
        &self.metadata.project_scope
    }
}

/// Read access to a set of documents keyed by id.
///
/// Implemented by the document store; consumed by the query evaluator so the
/// search crate does not depend on storage.
pub trait DocumentSource {
    fn get_document(&self, id: &str) -> Option<&Document>;

    fn documents(&self) -> Box<dyn Iterator<Item = &Document> + '_>;

    fn document_count(&self) -> usize;
}
