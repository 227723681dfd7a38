//! Per-project index instance.
//!
//! A [`ProjectIndex`] pairs the document store of one project with its
//! inverted index and snapshot file. Every mutation updates memory first and
//! then flushes the whole store to disk; a failed flush is reported to the
//! caller but not rolled back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use memory_search::{InvertedIndex, QueryEvaluator, SearchHits, SearchQuery};
use memory_storage::{DocumentStore, SnapshotFile, StorageError};
use memory_types::{DocType, Document, Settings};

use crate::error::ServiceError;
use crate::validation::{validate_document, validate_for_scope};

/// What happened when the snapshot was read at open time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No snapshot on disk
    Fresh,
    /// Snapshot parsed; documents restored
    Restored { documents: usize },
    /// Snapshot unreadable; started empty
    Recovered { reason: String },
}

/// Summary counters for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub terms: usize,
    pub by_type: BTreeMap<DocType, usize>,
    pub last_flush: Option<DateTime<Utc>>,
}

/// Document store + inverted index + snapshot for a single project scope.
#[derive(Debug)]
pub struct ProjectIndex {
    root: PathBuf,
    scope: String,
    store: DocumentStore,
    index: InvertedIndex,
    snapshot: SnapshotFile,
    load_outcome: LoadOutcome,
    last_flush: Option<DateTime<Utc>>,
}

impl ProjectIndex {
    /// Open the index for a project, restoring from its snapshot if possible.
    ///
    /// Never fails: a missing snapshot starts empty, an unreadable one is
    /// logged and replaced on the next successful flush.
    pub fn open(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        let root = root.into();
        let snapshot =
            SnapshotFile::new(settings.index_path(&root)).with_pretty(settings.pretty_snapshot);

        let (store, load_outcome) = match snapshot.load() {
            Ok(Some(mut store)) => {
                let dropped = store.retain(|doc| match validate_document(doc) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            project = ?root,
                            doc_id = %doc.id,
                            error = %e,
                            "Dropping invalid restored document"
                        );
                        false
                    }
                });
                if dropped > 0 {
                    warn!(project = ?root, dropped, "Snapshot held invalid documents");
                }
                let documents = store.len();
                (store, LoadOutcome::Restored { documents })
            }
            Ok(None) => (DocumentStore::new(), LoadOutcome::Fresh),
            Err(e) => {
                warn!(path = ?snapshot.path(), error = %e, "Snapshot unreadable, starting empty");
                (DocumentStore::new(), LoadOutcome::from(e))
            }
        };

        let mut index = InvertedIndex::new();
        index.rebuild(store.all());

        let scope = root.to_string_lossy().into_owned();
        info!(project = ?root, documents = store.len(), "Opened project index");

        Self {
            root,
            scope,
            store,
            index,
            snapshot,
            load_outcome,
            last_flush: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project scope string that documents of this index must carry.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.store.get(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.store.all()
    }

    pub fn inverted_index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Insert a document, replacing any existing document with the same id.
    pub fn insert(&mut self, doc: Document) -> Result<(), ServiceError> {
        validate_for_scope(&doc, &self.scope)?;
        self.replace(doc);
        self.flush()
    }

    /// Replace an existing document. Returns `Ok(false)` for unknown ids.
    pub fn update(&mut self, doc: Document) -> Result<bool, ServiceError> {
        validate_for_scope(&doc, &self.scope)?;
        if !self.store.contains(&doc.id) {
            debug!(doc_id = %doc.id, "Update of unknown document ignored");
            return Ok(false);
        }
        self.replace(doc);
        self.flush()?;
        Ok(true)
    }

    /// Delete a document. Returns `Ok(false)` for unknown ids.
    pub fn delete(&mut self, id: &str) -> Result<bool, ServiceError> {
        let Some(old) = self.store.remove(id) else {
            return Ok(false);
        };
        self.index.deindex(&old);
        self.flush()?;
        Ok(true)
    }

    /// Drop all postings and re-index every stored document.
    pub fn rebuild(&mut self) -> Result<usize, ServiceError> {
        let count = self.index.rebuild(self.store.all());
        self.flush()?;
        Ok(count)
    }

    pub fn search(&self, query: &SearchQuery) -> SearchHits {
        QueryEvaluator::new(&self.index, &self.store).search(query)
    }

    /// Documents of one kind, newest first.
    pub fn documents_by_type(&self, doc_type: DocType) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .store
            .all()
            .filter(|d| d.doc_type == doc_type)
            .collect();
        docs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        docs
    }

    pub fn stats(&self) -> IndexStats {
        let mut by_type = BTreeMap::new();
        for doc in self.store.all() {
            *by_type.entry(doc.doc_type).or_insert(0) += 1;
        }
        IndexStats {
            documents: self.store.len(),
            terms: self.index.term_count(),
            by_type,
            last_flush: self.last_flush,
        }
    }

    /// Write the whole store to the snapshot file.
    pub fn flush(&mut self) -> Result<(), ServiceError> {
        match self.snapshot.save(&self.store) {
            Ok(written) => {
                self.last_flush = Some(written);
                Ok(())
            }
            Err(e) => {
                warn!(
                    project = ?self.root,
                    error = %e,
                    "Snapshot write failed; memory is ahead of disk"
                );
                Err(ServiceError::Persistence(e))
            }
        }
    }

    fn replace(&mut self, doc: Document) {
        if let Some(old) = self.store.remove(&doc.id) {
            self.index.deindex(&old);
        }
        self.index.index(&doc);
        self.store.put(doc);
    }
}

impl From<StorageError> for LoadOutcome {
    fn from(err: StorageError) -> Self {
        LoadOutcome::Recovered {
            reason: err.to_string(),
        }
    }
}
