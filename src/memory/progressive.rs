//! Progressive-threshold search.
//!
//! [`progressive_search`] walks a [`ThresholdSequence`] from strictest to
//! loosest, issuing one remote search per threshold, and stops at the first
//! threshold that yields a qualifying record. If none does, the caller gets
//! [`ProgressiveOutcome::Exhausted`] rather than an empty result.

use serde::{Deserialize, Serialize};

use super::types::{ScopeFilter, SearchResult};
use super::MemoryStore;
use crate::error::{Error, Result};

/// Default cutoffs used when the configuration does not override them.
pub const DEFAULT_THRESHOLDS: [f64; 4] = [0.5, 0.4, 0.3, 0.2];

/// A non-empty, strictly descending list of minimum acceptance scores.
///
/// Construction validates the invariant, so a sequence that exists is always
/// safe to iterate: each step widens the candidate set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThresholdSequence(Vec<f64>);

impl ThresholdSequence {
    pub fn new(thresholds: Vec<f64>) -> Result<Self> {
        if thresholds.is_empty() {
            return Err(Error::invalid_config("threshold sequence must not be empty"));
        }
        for t in &thresholds {
            if !t.is_finite() || !(0.0..=1.0).contains(t) {
                return Err(Error::invalid_config(format!(
                    "threshold {t} is outside [0.0, 1.0]"
                )));
            }
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[1] >= w[0]) {
            return Err(Error::invalid_config(format!(
                "thresholds must be strictly descending, got {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self(thresholds))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ThresholdSequence {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS.to_vec())
    }
}

impl TryFrom<Vec<f64>> for ThresholdSequence {
    type Error = Error;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ThresholdSequence {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// What a progressive search produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressiveOutcome {
    /// The first threshold that yielded at least one qualifying record.
    Hit {
        threshold: f64,
        result: SearchResult,
        /// Number of remote calls made, including the successful one.
        attempts: usize,
    },
    /// Every threshold came back empty.
    Exhausted { attempts: usize },
}

impl ProgressiveOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            Self::Hit { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }
}

/// Try each threshold in order and return the first non-empty result.
///
/// Records the store returns below the current threshold are dropped, so a
/// store that ignores the cutoff cannot make an empty attempt look like a hit.
/// Remote failures abort immediately; no later thresholds are tried.
pub async fn progressive_search<S: MemoryStore>(
    store: &S,
    query: &str,
    scope: &ScopeFilter,
    thresholds: &ThresholdSequence,
) -> Result<ProgressiveOutcome> {
    let mut attempts = 0;

    for threshold in thresholds.iter() {
        attempts += 1;
        let mut result = store.search(query, scope, threshold).await?;
        result.records.retain(|r| r.score >= threshold);

        tracing::debug!(
            threshold,
            attempt = attempts,
            matched = result.len(),
            "progressive search attempt"
        );

        if !result.is_empty() {
            return Ok(ProgressiveOutcome::Hit {
                threshold,
                result,
                attempts,
            });
        }
    }

    tracing::debug!(attempts, "all thresholds exhausted");
    Ok(ProgressiveOutcome::Exhausted { attempts })
}
