//! Query evaluation: scoring, filtering, ranking and pagination.
//!
//! Scoring per query token:
//! - exact term match: 1.0 per document in the posting set
//! - every other indexed term containing the token: 0.5 per document
//!
//! Scores are divided by the number of query tokens and clamped to [0, 1].

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use memory_types::{Document, DocumentSource};

use crate::index::InvertedIndex;
use crate::query::SearchQuery;
use crate::terms::tokenize;

/// Score contribution of an exact term match.
pub const EXACT_MATCH_SCORE: f64 = 1.0;

/// Score contribution of a substring match against another indexed term.
pub const PARTIAL_MATCH_SCORE: f64 = 0.5;

/// A ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document: Document,
    /// Normalized relevance in [0, 1]; 0 for filter-only searches
    pub score: f64,
}

/// One page of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchHits {
    pub hits: Vec<SearchHit>,
    /// Matches before pagination
    pub total: usize,
}

impl SearchHits {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.document.id.as_str()).collect()
    }
}

/// Evaluates queries against an inverted index and its document source.
pub struct QueryEvaluator<'a, S: DocumentSource> {
    index: &'a InvertedIndex,
    documents: &'a S,
}

impl<'a, S: DocumentSource> QueryEvaluator<'a, S> {
    pub fn new(index: &'a InvertedIndex, documents: &'a S) -> Self {
        Self { index, documents }
    }

    /// Run a query.
    ///
    /// Filters only ever narrow the result, so a query that can never match
    /// (an inverted time range, say) yields an empty page rather than an error.
    pub fn search(&self, query: &SearchQuery) -> SearchHits {
        let tokens = tokenize(&query.term);
        let scored: Vec<(&'a Document, f64)> = if tokens.is_empty() {
            // Filter-only search over every document
            self.documents.documents().map(|doc| (doc, 0.0)).collect()
        } else {
            self.score_tokens(&tokens)
        };

        let mut hits: Vec<(&Document, f64)> = scored
            .into_iter()
            .filter(|(doc, _)| query.filters.matches(doc))
            .collect();

        hits.sort_by(|(a, score_a), (b, score_b)| rank(a, *score_a, b, *score_b));

        let total = hits.len();
        let limit = query.limit.unwrap_or(usize::MAX);
        let page: Vec<SearchHit> = hits
            .into_iter()
            .skip(query.offset)
            .take(limit)
            .map(|(doc, score)| SearchHit {
                document: doc.clone(),
                score,
            })
            .collect();

        debug!(
            term = %query.term,
            tokens = tokens.len(),
            total,
            returned = page.len(),
            "Evaluated search"
        );

        SearchHits { hits: page, total }
    }

    /// Accumulate and normalize per-document scores for the query tokens.
    fn score_tokens(&self, tokens: &[String]) -> Vec<(&'a Document, f64)> {
        let mut scores: HashMap<&'a str, f64> = HashMap::new();

        for token in tokens {
            if let Some(ids) = self.index.postings(token) {
                for id in ids {
                    *scores.entry(id.as_str()).or_insert(0.0) += EXACT_MATCH_SCORE;
                }
            }

            for (term, ids) in self.index.iter() {
                if term != token && term.contains(token.as_str()) {
                    for id in ids {
                        *scores.entry(id.as_str()).or_insert(0.0) += PARTIAL_MATCH_SCORE;
                    }
                }
            }
        }

        let token_count = tokens.len() as f64;
        scores
            .into_iter()
            .filter_map(|(id, raw)| {
                // Postings always reference stored documents when mutations go
                // through the project index; skip any that do not.
                let doc = self.documents.get_document(id)?;
                Some((doc, (raw / token_count).clamp(0.0, 1.0)))
            })
            .collect()
    }
}

/// Score descending, then timestamp descending, then id ascending.
fn rank(a: &Document, score_a: f64, b: &Document, score_b: f64) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then_with(|| b.timestamp.cmp(&a.timestamp))
        .then_with(|| a.id.cmp(&b.id))
}
