//! Snapshot file persistence.
//!
//! The whole document store of a project is written to a single JSON file
//! after every mutation. Writes go through a temp file in the same directory
//! and an atomic rename, so readers never observe a half-written snapshot.
//! The inverted index is not stored; it is rebuilt on load.

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use memory_types::Document;

use crate::error::StorageError;
use crate::store::DocumentStore;

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    pub documents: HashMap<String, Document>,

    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Reads and writes the snapshot file for one project.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    pretty: bool,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store.
    ///
    /// Returns `Ok(None)` when no snapshot exists and
    /// [`StorageError::Corrupt`] when the file cannot be parsed.
    pub fn load(&self) -> Result<Option<DocumentStore>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StorageError::Corrupt {
                path: self.path.clone(),
                reason: format!("unsupported snapshot version {}", snapshot.version),
            });
        }

        // Documents are keyed by their own id; a stale map key is ignored.
        let mismatched = snapshot
            .documents
            .iter()
            .filter(|(key, doc)| **key != doc.id)
            .count();
        if mismatched > 0 {
            warn!(
                path = ?self.path,
                mismatched,
                "Snapshot keys differ from document ids, re-keying"
            );
        }
        let store: DocumentStore = snapshot.documents.into_values().collect();

        info!(
            path = ?self.path,
            documents = store.len(),
            written = %snapshot.last_updated,
            "Loaded snapshot"
        );
        Ok(Some(store))
    }

    /// Overwrite the snapshot with the full contents of `store`.
    ///
    /// Creates missing parent directories. Returns the write timestamp.
    pub fn save(&self, store: &DocumentStore) -> Result<DateTime<Utc>, StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let last_updated = Utc::now();
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            documents: store.as_map(),
            last_updated,
        };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            } else {
                serde_json::to_writer(&mut writer, &snapshot)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;

        debug!(path = ?self.path, documents = store.len(), "Wrote snapshot");
        Ok(last_updated)
    }
}

/// Borrowing twin of [`Snapshot`] so saving does not clone every document.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    version: u32,
    documents: &'a HashMap<String, Document>,
    last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_types::{DocType, Priority};
    use tempfile::TempDir;

    fn sample_store() -> DocumentStore {
        vec![
            Document::new("a", DocType::Note, Utc::now(), "first note", "/p")
                .with_tags(["x", "y"])
                .with_title("First"),
            Document::new("b", DocType::Rule, Utc::now(), "a rule", "/p")
                .with_priority(Priority::High)
                .with_category("style"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("index.json"));
        let store = sample_store();

        file.save(&store).unwrap();
        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(".memory").join("index.json");
        let file = SnapshotFile::new(&path);

        file.save(&sample_store()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_load_rejects_future_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        fs::write(
            &path,
            br#"{"version":99,"documents":{},"lastUpdated":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_load_keys_documents_by_their_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        let doc = Document::new("v", DocType::Note, Utc::now(), "zebra crossing", "/p");
        let snapshot = serde_json::json!({
            "version": 1,
            "documents": { "k": doc },
            "lastUpdated": "2024-01-01T00:00:00Z",
        });
        fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

        let store = SnapshotFile::new(&path).load().unwrap().unwrap();
        assert!(store.get("k").is_none());
        assert_eq!(store.get("v"), Some(&doc));
    }

    #[test]
    fn test_snapshot_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        SnapshotFile::new(&path)
            .with_pretty(false)
            .save(&sample_store())
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert!(json["lastUpdated"].is_string());
        assert_eq!(json["documents"]["b"]["docType"], "rule");
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("index.json"));

        file.save(&sample_store()).unwrap();
        file.save(&DocumentStore::new()).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert!(loaded.is_empty());
        // No temp files left behind
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
