//! # memory-search
//!
//! Keyword search over project documents.
//!
//! ## Features
//! - Term extraction from content, title, tags, category, priority and type
//! - In-memory inverted index with incremental add/remove and full rebuild
//! - Exact + substring scoring normalized to [0, 1]
//! - Structured filters (type, tags, priority, category, time range)
//! - Offset/limit pagination over score- then time-ordered results

pub mod index;
pub mod query;
pub mod searcher;
pub mod terms;

pub use index::{InvertedIndex, PostingSet};
pub use query::{SearchFilters, SearchQuery, TimeRange};
pub use searcher::{QueryEvaluator, SearchHit, SearchHits, EXACT_MATCH_SCORE, PARTIAL_MATCH_SCORE};
pub use terms::{extract_terms, tokenize};
