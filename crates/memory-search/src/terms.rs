//! Term extraction.
//!
//! Turns a document's textual fields into the set of lowercase terms it is
//! indexed under. No stemming and no stop words.

use std::collections::BTreeSet;

use memory_types::Document;

/// Tokens of this many characters or fewer are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize free text.
///
/// Lowercases, removes every character that is not a word character, a hyphen
/// or whitespace, splits on whitespace and keeps tokens longer than
/// [`MIN_TOKEN_CHARS`]. Duplicates are preserved in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || *c == '-' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Extract the deduplicated term set for a document.
///
/// Sources:
/// - content and title, tokenized with [`tokenize`]
/// - each tag and the category, lowercased as whole units
/// - priority and doc type names
pub fn extract_terms(doc: &Document) -> BTreeSet<String> {
    let mut terms: BTreeSet<String> = tokenize(&doc.content).into_iter().collect();

    if let Some(title) = &doc.metadata.title {
        terms.extend(tokenize(title));
    }

    for tag in &doc.tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() {
            terms.insert(tag);
        }
    }

    let category = doc.metadata.category.trim().to_lowercase();
    if !category.is_empty() {
        terms.insert(category);
    }

    terms.insert(doc.metadata.priority.as_str().to_string());
    terms.insert(doc.doc_type.as_str().to_string());

    terms
}
