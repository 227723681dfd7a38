//! Concurrency E2E tests for project-memory.
//!
//! Many writers and readers share one registry. Writes to a project are
//! serialized, so every acknowledged insert must be visible afterwards and
//! in the persisted snapshot.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use e2e_tests::TestHarness;
use memory_search::SearchQuery;
use memory_types::{DocType, Document};

const WRITERS: usize = 8;
const DOCS_PER_WRITER: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_and_searches() {
    let harness = TestHarness::new();
    let root = harness.root().to_path_buf();

    let mut tasks = Vec::new();
    for w in 0..WRITERS {
        let registry = Arc::clone(&harness.registry);
        let root = root.clone();
        let scope = harness.scope.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            for i in 0..DOCS_PER_WRITER {
                let doc = Document::new(
                    format!("w{w}-{i}"),
                    DocType::Note,
                    e2e_tests::base_time(),
                    format!("Concurrent writer {w} entry {i}"),
                    scope.as_str(),
                );
                registry.insert(&root, doc).expect("insert failed");
                registry
                    .search(&root, &SearchQuery::new("concurrent"))
                    .expect("search failed");
            }
        }));
    }

    for task in tasks {
        task.await.expect("writer task panicked");
    }

    let expected = WRITERS * DOCS_PER_WRITER;
    let hits = harness
        .registry
        .search(&root, &SearchQuery::new("concurrent").with_limit(expected))
        .unwrap();
    assert_eq!(hits.total, expected);

    let restarted = harness.restart();
    assert_eq!(restarted.stats(&root).unwrap().documents, expected);
}

/// Independent projects do not block or see each other.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_projects_written_in_parallel_stay_isolated() {
    let a = TestHarness::new();
    let b = TestHarness::new();

    let handles = [&a, &b].map(|h| {
        let registry = Arc::clone(&h.registry);
        let root = h.root().to_path_buf();
        let scope = h.scope.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..5 {
                let doc = Document::new(
                    format!("{i}"),
                    DocType::Note,
                    e2e_tests::base_time(),
                    "isolated entry",
                    scope.as_str(),
                );
                registry.insert(&root, doc).expect("insert failed");
            }
        })
    });
    for handle in handles {
        handle.await.expect("task panicked");
    }

    for h in [&a, &b] {
        let hits = h.registry.search(h.root(), &SearchQuery::new("isolated")).unwrap();
        assert_eq!(hits.total, 5);
        assert!(hits.hits.iter().all(|hit| hit.document.metadata.project_scope == h.scope));
    }
}
