//! Plans, observations, and decoding them from model output.
//!
//! Model replies are expected to be JSON, but models wrap JSON in code fences,
//! prepend prose, or return something else entirely. [`parse_plan`] and
//! [`parse_observation`] return [`Parsed`], never an error; the loop decides
//! what fallback to substitute.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Tagged result of decoding structured model output.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Ok(T),
    Malformed { raw: String, reason: String },
}

impl<T> Parsed<T> {
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Take the decoded value or build the fallback, logging what was dropped.
    pub fn or_fallback(self, what: &'static str, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Malformed { raw, reason } => {
                tracing::warn!(what, %reason, raw_len = raw.len(), "malformed model output, using fallback");
                fallback()
            }
        }
    }
}

/// The current research question and the sub-queries still to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub research_question: String,
    #[serde(default, alias = "search_queries", alias = "queries")]
    pub pending: VecDeque<String>,
}

impl Plan {
    /// The fallback plan: no question, no sub-queries.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(research_question: impl Into<String>, pending: impl IntoIterator<Item = String>) -> Self {
        Self {
            research_question: research_question.into(),
            pending: pending.into_iter().collect(),
        }
    }

    /// Pop pending sub-queries until a non-blank one turns up.
    pub fn next_query(&mut self) -> Option<String> {
        while let Some(candidate) = self.pending.pop_front() {
            let trimmed = candidate.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        None
    }

    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|q| !q.trim().is_empty())
    }
}

/// What the observer concluded from one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, alias = "key_insights")]
    pub insights: String,
    #[serde(default, alias = "continue")]
    pub continue_research: bool,
}

impl Observation {
    /// The fallback observation: nothing learned, stop researching.
    pub fn halt() -> Self {
        Self::default()
    }

    pub fn keep_going(insights: impl Into<String>) -> Self {
        Self {
            insights: insights.into(),
            continue_research: true,
        }
    }

    pub fn done(insights: impl Into<String>) -> Self {
        Self {
            insights: insights.into(),
            continue_research: false,
        }
    }
}

pub fn parse_plan(raw: &str) -> Parsed<Plan> {
    parse_json_object(raw)
}

pub fn parse_observation(raw: &str) -> Parsed<Observation> {
    parse_json_object(raw)
}

fn parse_json_object<T: serde::de::DeserializeOwned>(raw: &str) -> Parsed<T> {
    let Some(candidate) = extract_json_object(raw) else {
        return Parsed::malformed(raw, "no JSON object found");
    };
    match serde_json::from_str(candidate) {
        Ok(value) => Parsed::Ok(value),
        Err(e) => Parsed::malformed(raw, e.to_string()),
    }
}

/// Slice from the first `{` to the last `}`. Handles code fences and leading
/// or trailing prose without a full JSON scanner.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_plan() {
        let raw = r#"{"research_question": "Where to travel?", "search_queries": ["beach", "mountains"]}"#;
        let Parsed::Ok(plan) = parse_plan(raw) else {
            panic!("expected a plan");
        };
        assert_eq!(plan.research_question, "Where to travel?");
        assert_eq!(plan.pending, VecDeque::from(vec!["beach".to_string(), "mountains".to_string()]));
    }

    #[test]
    fn parses_fenced_plan_with_prose() {
        let raw = "Sure! Here is the plan:\n```json\n{\"research_question\": \"q\", \"pending\": [\"a\"]}\n```\nGood luck.";
        let plan = parse_plan(raw).or_fallback("plan", Plan::empty);
        assert_eq!(plan.pending.len(), 1);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(parse_plan("I cannot help with that.").is_malformed());
        assert!(parse_plan("{not json}").is_malformed());
        assert!(parse_plan("} backwards {").is_malformed());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(parse_plan(r#"{"search_queries": "not a list"}"#).is_malformed());
    }

    #[test]
    fn fallback_constructor_used_on_malformed() {
        let plan = parse_plan("nope").or_fallback("plan", Plan::empty);
        assert_eq!(plan, Plan::empty());
    }

    #[test]
    fn next_query_skips_blank_entries() {
        let mut plan = Plan::new("q", vec!["  ".to_string(), "".to_string(), " real ".to_string()]);
        assert!(plan.has_pending());
        assert_eq!(plan.next_query().as_deref(), Some("real"));
        assert_eq!(plan.next_query(), None);
        assert!(!plan.has_pending());
    }

    #[test]
    fn observation_accepts_continue_alias() {
        let raw = r#"{"key_insights": "likes sushi", "continue": true}"#;
        let obs = parse_observation(raw).or_fallback("observation", Observation::halt);
        assert_eq!(obs, Observation::keep_going("likes sushi"));
    }

    #[test]
    fn malformed_observation_halts() {
        let obs = parse_observation("maybe?").or_fallback("observation", Observation::halt);
        assert!(!obs.continue_research);
        assert!(obs.insights.is_empty());
    }
}
