//! In-memory document store.
//!
//! The authoritative id -> document map for one project. It does not touch
//! the inverted index; callers replacing a document must deindex the old
//! version first.

use std::collections::HashMap;

use tracing::debug;

use memory_types::{Document, DocumentSource};

/// Id -> document map for a single project scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous document with the same id.
    pub fn put(&mut self, doc: Document) -> Option<Document> {
        debug!(doc_id = %doc.id, doc_type = %doc.doc_type, "Stored document");
        self.documents.insert(doc.id.clone(), doc)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Remove a document, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let removed = self.documents.remove(id);
        if removed.is_some() {
            debug!(doc_id = id, "Removed document");
        }
        removed
    }

    /// True if a document existed and was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// All documents in unspecified order.
    pub fn all(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Keep only documents for which `keep` returns true. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&Document) -> bool) -> usize {
        let before = self.documents.len();
        self.documents.retain(|_, doc| keep(doc));
        before - self.documents.len()
    }

    /// Borrow the underlying map (used by snapshot serialization).
    pub fn as_map(&self) -> &HashMap<String, Document> {
        &self.documents
    }
}

impl FromIterator<Document> for DocumentStore {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}

impl DocumentSource for DocumentStore {
    fn get_document(&self, id: &str) -> Option<&Document> {
        self.get(id)
    }

    fn documents(&self) -> Box<dyn Iterator<Item = &Document> + '_> {
        Box::new(self.all())
    }

    fn document_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use memory_types::DocType;

    fn doc(id: &str, content: &str) -> Document {
        Document::new(id, DocType::Note, Utc::now(), content, "/p")
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let mut store = DocumentStore::new();
        let d = doc("a", "hello world");
        assert!(store.put(d.clone()).is_none());
        assert_eq!(store.get("a"), Some(&d));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_replaces_and_returns_previous() {
        let mut store = DocumentStore::new();
        store.put(doc("a", "first"));
        let previous = store.put(doc("a", "second")).unwrap();
        assert_eq!(previous.content, "first");
        assert_eq!(store.get("a").unwrap().content, "second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete() {
        let mut store = DocumentStore::new();
        store.put(doc("a", "x"));
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert!(store.get("a").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_and_source_trait() {
        let store: DocumentStore = vec![doc("a", "x"), doc("b", "y")].into_iter().collect();
        let mut ids: Vec<&str> = store.all().map(|d| d.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.document_count(), 2);
        assert!(store.get_document("b").is_some());
    }
}
