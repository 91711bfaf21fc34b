use serde::{Deserialize, Serialize};

use super::Movie;

/// A search term ranked by how often it produced results
///
/// `movie` is the first result captured when the term was first recorded and
/// is never replaced afterwards. Counts only move inside the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingEntry {
    pub query: String,
    pub count: u64,
    pub movie: Movie,
}

/// Store key for a search term: trimmed and case-folded so that
/// "Inception" and "inception " rank together.
pub fn trending_key(query: &str) -> String {
    query.trim().to_lowercase()
}
