use serde::Serialize;

use super::fallback::fallback_match;
use super::progressive::{progressive_search, ProgressiveOutcome, ThresholdSequence};
use super::types::{ScopeFilter, SearchResult};
use super::MemoryStore;
use crate::error::Result;

/// Search knobs fixed at configuration time.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    pub thresholds: ThresholdSequence,
    /// Maximum number of records the fallback may scan.
    pub fallback_limit: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            thresholds: ThresholdSequence::default(),
            fallback_limit: 100,
        }
    }
}

/// Result of a full search: either a threshold hit or the substring fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SearchOutcome {
    Matched { threshold: f64, result: SearchResult },
    Fallback { result: SearchResult },
}

impl SearchOutcome {
    pub fn result(&self) -> &SearchResult {
        match self {
            Self::Matched { result, .. } | Self::Fallback { result } => result,
        }
    }

    pub fn into_result(self) -> SearchResult {
        match self {
            Self::Matched { result, .. } | Self::Fallback { result } => result,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        match self {
            Self::Matched { threshold, .. } => Some(*threshold),
            Self::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Progressive search, then the substring fallback on exhaustion.
pub async fn search_with_fallback<S: MemoryStore>(
    store: &S,
    query: &str,
    scope: &ScopeFilter,
    policy: &SearchPolicy,
) -> Result<SearchOutcome> {
    match progressive_search(store, query, scope, &policy.thresholds).await? {
        ProgressiveOutcome::Hit {
            threshold, result, ..
        } => {
            tracing::info!(query, threshold, results = result.len(), "memory search hit");
            Ok(SearchOutcome::Matched { threshold, result })
        }
        ProgressiveOutcome::Exhausted { attempts } => {
            tracing::warn!(query, attempts, "no threshold matched, falling back to text match");
            let result = fallback_match(store, query, scope, policy.fallback_limit).await?;
            Ok(SearchOutcome::Fallback { result })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::Record;

    #[test]
    fn outcome_accessors() {
        let matched = SearchOutcome::Matched {
            threshold: 0.4,
            result: vec![Record::new("a", "alpha", 0.45)].into(),
        };
        assert_eq!(matched.threshold(), Some(0.4));
        assert!(!matched.is_fallback());
        assert_eq!(matched.result().len(), 1);

        let fallback = SearchOutcome::Fallback {
            result: SearchResult::default(),
        };
        assert_eq!(fallback.threshold(), None);
        assert!(fallback.is_fallback());
        assert!(fallback.into_result().is_empty());
    }

    #[test]
    fn outcome_serializes_with_strategy_tag() {
        let matched = SearchOutcome::Matched {
            threshold: 0.5,
            result: SearchResult::default(),
        };
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value["strategy"], "matched");
        assert_eq!(value["threshold"], 0.5);
    }
}
