//! Persistence E2E tests for project-memory.
//!
//! Validates that every acknowledged mutation survives a restart: a fresh
//! registry initialized on the same project root sees the same documents
//! and answers the same searches.

use pretty_assertions::assert_eq;

use e2e_tests::{create_test_documents, TestHarness};
use memory_search::SearchQuery;
use memory_service::{LoadOutcome, ServiceError};
use memory_storage::SnapshotFile;
use memory_types::{DocType, Priority, Settings};

/// All inserted documents are retrievable and searchable after a restart.
#[test]
fn test_documents_survive_restart() {
    let harness = TestHarness::new();
    let docs = create_test_documents(&harness.scope, "doc", 25, "Tokio runtime notes");
    harness.insert_all(docs.clone());

    let restarted = harness.restart();

    for doc in &docs {
        let restored = restarted
            .get(harness.root(), &doc.id)
            .unwrap()
            .expect("document missing after restart");
        assert_eq!(&restored, doc);
    }

    let hits = restarted
        .search(harness.root(), &SearchQuery::new("tokio").with_limit(100))
        .unwrap();
    assert_eq!(hits.total, 25);

    let high = restarted
        .search(harness.root(), &SearchQuery::all().with_priority(Priority::High))
        .unwrap();
    assert_eq!(high.total, docs.iter().filter(|d| d.metadata.priority == Priority::High).count());
}

/// Deletes and updates are persisted, not just inserts.
#[test]
fn test_mutations_survive_restart() {
    let harness = TestHarness::new();
    harness.insert_all([
        harness.doc("keep", DocType::Rule, "Never block inside async code"),
        harness.doc("drop", DocType::Note, "Temporary scratch note"),
    ]);

    assert!(harness.registry.delete(harness.root(), "drop").unwrap());
    let updated = harness.doc("keep", DocType::Rule, "Use spawn_blocking for blocking work");
    assert!(harness.registry.update(harness.root(), updated.clone()).unwrap());

    let on_disk = SnapshotFile::new(Settings::default().index_path(harness.root()))
        .load()
        .unwrap()
        .expect("snapshot missing after mutations");
    assert_eq!(on_disk.len(), 1);
    assert!(!on_disk.contains("drop"));
    assert_eq!(on_disk.get("keep"), Some(&updated));

    let restarted = harness.restart();
    assert!(restarted.get(harness.root(), "drop").unwrap().is_none());
    assert_eq!(restarted.get(harness.root(), "keep").unwrap(), Some(updated));

    assert!(restarted
        .search(harness.root(), &SearchQuery::new("async"))
        .unwrap()
        .is_empty());
    assert_eq!(
        restarted
            .search(harness.root(), &SearchQuery::new("spawn_blocking"))
            .unwrap()
            .ids(),
        vec!["keep"]
    );
}

/// Snapshot lands at <root>/.memory/search-index.json in the versioned format.
#[test]
fn test_snapshot_file_layout() {
    let harness = TestHarness::new();
    harness.insert_all([harness.doc("a", DocType::Decision, "Adopt serde for snapshots")]);

    let path = Settings::default().index_path(harness.root());
    assert!(path.ends_with(".memory/search-index.json"));

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], 1);
    assert!(value["lastUpdated"].is_string());
    assert_eq!(value["documents"]["a"]["docType"], "decision");
    assert_eq!(value["documents"]["a"]["metadata"]["projectScope"], harness.scope.as_str());
}

/// A corrupt snapshot starts an empty index instead of failing initialize.
#[test]
fn test_corrupt_snapshot_recovers_empty() {
    let harness = TestHarness::new();
    harness.insert_all([harness.doc("a", DocType::Note, "Soon to be clobbered")]);

    let path = Settings::default().index_path(harness.root());
    std::fs::write(&path, "{ not json").unwrap();

    let restarted = harness.restart();
    let handle = restarted.lookup(harness.root()).unwrap();
    let project = handle.read().unwrap();
    assert!(project.is_empty());
    assert!(matches!(project.load_outcome(), LoadOutcome::Recovered { .. }));
}

/// An unwritable snapshot location surfaces a persistence error, with the
/// in-memory change kept.
#[test]
fn test_write_failure_is_reported() {
    let harness = TestHarness::new();
    let index_dir = harness.root().join(".memory");
    std::fs::remove_dir_all(&index_dir).ok();
    std::fs::write(&index_dir, "not a directory").unwrap();

    let err = harness
        .registry
        .insert(harness.root(), harness.doc("a", DocType::Note, "Unflushable content"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(_)));

    let hits = harness
        .registry
        .search(harness.root(), &SearchQuery::new("unflushable"))
        .unwrap();
    assert_eq!(hits.ids(), vec!["a"]);
}
