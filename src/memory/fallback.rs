//! Substring fallback used after every threshold comes back empty.

use super::types::{ScopeFilter, SearchResult};
use super::MemoryStore;
use crate::error::Result;

/// Fetch up to `limit` records unranked and keep those containing `query`
/// (case-insensitive). Retrieval order is preserved.
pub async fn fallback_match<S: MemoryStore>(
    store: &S,
    query: &str,
    scope: &ScopeFilter,
    limit: usize,
) -> Result<SearchResult> {
    let mut bulk = store.get_all(scope, limit).await?;
    bulk.records.truncate(limit);
    let scanned = bulk.len();

    let needle = query.to_lowercase();
    bulk.records.retain(|r| contains_ignore_case(&r.text, &needle));

    tracing::debug!(scanned, matched = bulk.len(), "fallback text match");
    Ok(bulk)
}

/// `needle` must already be lowercased.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
