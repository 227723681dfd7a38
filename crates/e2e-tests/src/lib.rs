//! End-to-end test infrastructure for project-memory.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full insert-persist-restore-search path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use memory_service::IndexRegistry;
use memory_types::{DocType, Document, Priority, Settings};

/// Shared test harness for E2E tests.
///
/// Owns a temporary project root and a registry with that project
/// already initialized.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared registry instance
    pub registry: Arc<IndexRegistry>,
    /// Project root (inside the temp dir)
    pub root: PathBuf,
    /// Project scope documents must carry
    pub scope: String,
}

impl TestHarness {
    /// Create a new harness with an initialized, empty project.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("project");
        std::fs::create_dir_all(&root).expect("Failed to create project dir");

        let registry = Arc::new(IndexRegistry::new(Settings::default()));
        let handle = registry
            .initialize(&root)
            .expect("Failed to initialize project index");
        let scope = handle
            .read()
            .expect("Project lock poisoned")
            .scope()
            .to_string();

        Self {
            _temp_dir: temp_dir,
            registry,
            root,
            scope,
        }
    }

    /// A fresh registry over the same project root, as after a process restart.
    pub fn restart(&self) -> Arc<IndexRegistry> {
        let registry = Arc::new(IndexRegistry::new(Settings::default()));
        registry
            .initialize(&self.root)
            .expect("Failed to re-initialize project index");
        registry
    }

    /// Build a document scoped to this harness's project.
    pub fn doc(&self, id: &str, doc_type: DocType, content: &str) -> Document {
        Document::new(id, doc_type, base_time(), content, self.scope.as_str())
    }

    /// Insert every document, panicking on the first failure.
    pub fn insert_all(&self, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.registry
                .insert(&self.root, doc)
                .expect("Failed to insert document");
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed reference time so ordering assertions are deterministic.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 29, 12, 0, 0).unwrap()
}

/// Create N notes with sequential timestamps one minute apart.
///
/// Ids are `{prefix}-{i}`; content is the base text with the index appended.
pub fn create_test_documents(
    scope: &str,
    prefix: &str,
    count: usize,
    base_text: &str,
) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let priority = match i % 3 {
                0 => Priority::Low,
                1 => Priority::Medium,
                _ => Priority::High,
            };
            Document::new(
                format!("{prefix}-{i}"),
                DocType::Note,
                base_time() + Duration::minutes(i as i64),
                format!("{base_text} (entry {i})"),
                scope,
            )
            .with_priority(priority)
        })
        .collect()
}
