//! Prefix completion over the suggest field
//!
//! Completion inputs are written at projection time into a raw-tokenized
//! field, so every input is a whole term in the segment term dictionaries.
//! A lookup is an FST range scan from the prefix, never a document scan.

use crate::search::error::{SearchError, SearchResult};
use crate::search::index::IndexManager;
use std::sync::Arc;

/// Ranked prefix suggestions backed by the index term dictionaries.
pub struct SuggestionEngine {
    index: Arc<IndexManager>,
    limit: usize,
}

impl SuggestionEngine {
    pub fn new(index: Arc<IndexManager>, limit: usize) -> Self {
        Self { index, limit }
    }

    /// Return up to `limit` completion strings for the prefix.
    ///
    /// The prefix is trimmed and lower-cased; blank input yields nothing.
    /// Results are deduplicated across segments and defensively re-filtered
    /// to true prefix matches.
    pub fn suggest(&self, prefix: &str) -> SearchResult<Vec<String>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let field = self
            .index
            .schema()
            .get_field("suggest")
            .map_err(|_| SearchError::SchemaError("suggest field missing".to_string()))?;

        let searcher = self.index.reader().searcher();
        let mut suggestions: Vec<String> = Vec::new();

        for segment_reader in searcher.segment_readers() {
            let inverted = segment_reader
                .inverted_index(field)
                .map_err(|e| SearchError::SearchFailed(format!("term dictionary: {}", e)))?;
            let dict = inverted.terms();

            let mut stream = dict
                .range()
                .ge(prefix.as_bytes())
                .into_stream()
                .map_err(|e| SearchError::SearchFailed(format!("term stream: {}", e)))?;

            while stream.advance() {
                let term = match std::str::from_utf8(stream.key()) {
                    Ok(term) => term,
                    Err(_) => continue,
                };
                // Terms are sorted; the first non-prefix key ends this segment
                if !term.to_lowercase().starts_with(&prefix) {
                    break;
                }
                if !suggestions.iter().any(|s| s == term) {
                    suggestions.push(term.to_string());
                }
                if suggestions.len() >= self.limit * 2 {
                    break;
                }
            }
        }

        suggestions.sort();
        suggestions.truncate(self.limit);

        tracing::debug!(prefix = %prefix, count = suggestions.len(), "Suggest lookup");
        Ok(suggestions)
    }
}
