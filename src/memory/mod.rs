//! Memory search: the store abstraction, progressive-threshold search, and the
//! substring fallback.
//!
//! The [`MemoryStore`] trait is the seam to the hosted memory service.
//! [`mem0::Mem0Client`] is the production implementation; tests drive the
//! search policy with in-process fakes.

pub mod fallback;
pub mod mem0;
pub mod progressive;
pub mod search;
pub mod types;

use std::future::Future;

use crate::error::Result;
use types::{ScopeFilter, SearchResult};

/// A remote memory store with server-side score cutoff.
///
/// Each method is exactly one remote call. Implementations must not retry;
/// a failure is surfaced to the caller as-is.
pub trait MemoryStore: Send + Sync {
    /// Semantic search returning only records with `score >= threshold`.
    fn search(
        &self,
        query: &str,
        scope: &ScopeFilter,
        threshold: f64,
    ) -> impl Future<Output = Result<SearchResult>> + Send;

    /// Unranked bulk retrieval of up to `limit` records within `scope`,
    /// including its metadata constraints.
    fn get_all(
        &self,
        scope: &ScopeFilter,
        limit: usize,
    ) -> impl Future<Output = Result<SearchResult>> + Send;
}
