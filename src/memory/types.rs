//! Memory record and query scope definitions.
//!
//! Defines [`ScopeFilter`] (identity and metadata constraints sent with every
//! store call), [`Record`] (a single stored memory as returned by the store),
//! and [`SearchResult`] (an ordered batch of records from one call).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity and metadata constraints applied to every store call.
///
/// All fields are optional. An empty filter means "whatever the store's
/// default visibility is", which for mem0 is usually an error, so callers
/// normally set at least `user_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Exact-match metadata constraints (key → expected JSON value).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ScopeFilter {
    /// Filter scoped to a single user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.agent_id.is_none()
            && self.run_id.is_none()
            && self.metadata.is_empty()
    }

    /// True when `record` carries every metadata constraint of this filter
    /// with an equal value. A filter without metadata admits every record.
    pub fn admits(&self, record: &Record) -> bool {
        self.metadata.iter().all(|(key, expected)| {
            record
                .metadata
                .as_ref()
                .and_then(|m| m.get(key))
                .is_some_and(|actual| actual == expected)
        })
    }
}

/// A stored memory as returned by a search or bulk retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque store-assigned identifier.
    pub id: String,
    /// The memory text. mem0 calls this field `memory`.
    #[serde(alias = "memory")]
    pub text: String,
    /// Relevance score in `[0.0, 1.0]`. Bulk retrieval has no ranking, so
    /// records from `get_all` carry `0.0`.
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Records returned by one store call, in the order the store returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub records: Vec<Record>,
}

impl SearchResult {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Total bytes of record text, used for context budgeting.
    pub fn text_len(&self) -> usize {
        self.records.iter().map(|r| r.text.len()).sum()
    }
}

impl From<Vec<Record>> for SearchResult {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}
