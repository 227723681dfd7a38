//! In-memory inverted index.
//!
//! Maps each term to the set of document ids whose extracted terms include it.
//! The index is a derived cache: it is never persisted and can always be
//! rebuilt from the document store.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use memory_types::Document;

use crate::terms::extract_terms;

/// Posting set: ids of documents containing a term.
pub type PostingSet = HashSet<String>;

/// Term -> posting set map.
///
/// Empty posting sets are removed eagerly, so every stored term has at least
/// one posting.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingSet>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `doc.id` to the posting set of every term of `doc`.
    pub fn index(&mut self, doc: &Document) {
        let terms = extract_terms(doc);
        let count = terms.len();
        for term in terms {
            self.postings
                .entry(term)
                .or_default()
                .insert(doc.id.clone());
        }
        debug!(doc_id = %doc.id, terms = count, "Indexed document");
    }

    /// Remove `doc.id` from the posting sets of the terms of `doc`.
    ///
    /// `doc` must be the version that was indexed, otherwise postings for
    /// terms only present in the indexed version are left behind.
    pub fn deindex(&mut self, doc: &Document) {
        let mut emptied = 0usize;
        for term in extract_terms(doc) {
            if let Some(ids) = self.postings.get_mut(&term) {
                ids.remove(&doc.id);
                if ids.is_empty() {
                    self.postings.remove(&term);
                    emptied += 1;
                }
            }
        }
        debug!(doc_id = %doc.id, emptied, "Deindexed document");
    }

    /// Clear all postings and index every document again.
    pub fn rebuild<'a, I>(&mut self, docs: I) -> usize
    where
        I: IntoIterator<Item = &'a Document>,
    {
        self.postings.clear();
        let mut count = 0;
        for doc in docs {
            self.index(doc);
            count += 1;
        }
        info!(documents = count, terms = self.postings.len(), "Rebuilt inverted index");
        count
    }

    /// Exact posting set for a term.
    pub fn postings(&self, term: &str) -> Option<&PostingSet> {
        self.postings.get(term)
    }

    /// Iterate over all (term, posting set) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostingSet)> {
        self.postings.iter().map(|(term, ids)| (term.as_str(), ids))
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }
}
