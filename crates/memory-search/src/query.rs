//! Search query and filter types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memory_types::{DocType, Document, Priority};

/// Inclusive timestamp range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self::new(Some(start), None)
    }

    pub fn until(end: DateTime<Utc>) -> Self {
        Self::new(None, Some(end))
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *ts >= start) && self.end.map_or(true, |end| *ts <= end)
    }
}

/// Structured filters. All active predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub doc_type: Option<DocType>,

    /// Every listed tag must be a case-insensitive substring of some document tag
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub priority: Option<Priority>,

    /// Case-insensitive substring of the document category
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl SearchFilters {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.doc_type.is_none()
            && self.tags.is_empty()
            && self.priority.is_none()
            && self.category.is_none()
            && self.time_range.is_none()
    }

    /// Check a document against every active predicate.
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(doc_type) = self.doc_type {
            if doc.doc_type != doc_type {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if doc.metadata.priority != priority {
                return false;
            }
        }

        if let Some(category) = &self.category {
            let wanted = category.to_lowercase();
            if !doc.metadata.category.to_lowercase().contains(&wanted) {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let doc_tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();
            let all_present = self.tags.iter().all(|wanted| {
                let wanted = wanted.to_lowercase();
                doc_tags.iter().any(|tag| tag.contains(&wanted))
            });
            if !all_present {
                return false;
            }
        }

        if let Some(range) = &self.time_range {
            if !range.contains(&doc.timestamp) {
                return false;
            }
        }

        true
    }
}

/// A search request: free text plus filters and pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free text. Empty means filter-only search.
    #[serde(default)]
    pub term: String,

    #[serde(default)]
    pub filters: SearchFilters,

    /// Page size (None = all matches)
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: usize,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    /// Filter-only query.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.filters.doc_type = Some(doc_type);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.filters.tags.push(tag.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.filters.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.filters.category = Some(category.into());
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.filters.time_range = Some(range);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}
