//! Bounded research context carried across loop iterations.

use std::collections::VecDeque;
use std::fmt::Write as _;

use serde::Serialize;

use super::plan::Observation;
use crate::memory::search::SearchOutcome;

/// One completed plan → search → observe cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchStep {
    /// 1-based iteration number.
    pub iteration: usize,
    pub query: String,
    pub outcome: SearchOutcome,
    pub observation: Observation,
}

impl ResearchStep {
    /// Approximate rendered size in bytes, used for the context budget.
    pub fn size(&self) -> usize {
        self.query.len() + self.outcome.result().text_len() + self.observation.insights.len()
    }
}

/// Append-only step history, bounded by total [`ResearchStep::size`].
///
/// When a push takes the total over `max_bytes`, the oldest steps are evicted
/// until it fits again. The newest step is always kept, even if it alone
/// exceeds the budget.
#[derive(Debug, Clone)]
pub struct ResearchContext {
    steps: VecDeque<ResearchStep>,
    max_bytes: usize,
    total_bytes: usize,
    evicted: usize,
}

impl ResearchContext {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            steps: VecDeque::new(),
            max_bytes,
            total_bytes: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, step: ResearchStep) {
        self.total_bytes += step.size();
        self.steps.push_back(step);

        while self.total_bytes > self.max_bytes && self.steps.len() > 1 {
            if let Some(old) = self.steps.pop_front() {
                self.total_bytes -= old.size();
                self.evicted += 1;
                tracing::debug!(iteration = old.iteration, "evicted research step from context");
            }
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = &ResearchStep> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Number of steps dropped to stay within budget.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Plain-text rendering for model prompts.
    pub fn render(&self) -> String {
        if self.steps.is_empty() {
            return "(no research yet)".to_string();
        }
        let mut out = String::new();
        for step in &self.steps {
            let _ = writeln!(out, "## Step {}: {}", step.iteration, step.query);
            for record in &step.outcome.result().records {
                let _ = writeln!(out, "- {}", record.text);
            }
            if !step.observation.insights.is_empty() {
                let _ = writeln!(out, "Insights: {}", step.observation.insights);
            }
            out.push('\n');
        }
        out
    }

    pub(crate) fn into_steps(self) -> Vec<ResearchStep> {
        self.steps.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::{Record, SearchResult};

    fn step(iteration: usize, text: &str) -> ResearchStep {
        ResearchStep {
            iteration,
            query: "q".into(),
            outcome: SearchOutcome::Fallback {
                result: SearchResult::new(vec![Record::new(iteration.to_string(), text, 0.0)]),
            },
            observation: Observation::halt(),
        }
    }

    #[test]
    fn keeps_everything_under_budget() {
        let mut ctx = ResearchContext::new(1000);
        ctx.push(step(1, "alpha"));
        ctx.push(step(2, "beta"));
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.evicted(), 0);
        assert_eq!(ctx.total_bytes(), (1 + 5) + (1 + 4));
    }

    #[test]
    fn evicts_oldest_first() {
        // each step is 1 (query) + 10 (text) = 11 bytes
        let mut ctx = ResearchContext::new(25);
        ctx.push(step(1, "aaaaaaaaaa"));
        ctx.push(step(2, "bbbbbbbbbb"));
        ctx.push(step(3, "cccccccccc"));

        let iterations: Vec<usize> = ctx.steps().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![2, 3]);
        assert_eq!(ctx.evicted(), 1);
        assert!(ctx.total_bytes() <= 25);
    }

    #[test]
    fn oversized_newest_step_is_retained() {
        let mut ctx = ResearchContext::new(5);
        ctx.push(step(1, "ab"));
        ctx.push(step(2, "this one is far too long"));
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.steps().next().unwrap().iteration, 2);
    }

    #[test]
    fn render_lists_steps() {
        let mut ctx = ResearchContext::new(1000);
        assert_eq!(ctx.render(), "(no research yet)");
        ctx.push(step(1, "likes tea"));
        let text = ctx.render();
        assert!(text.contains("## Step 1: q"));
        assert!(text.contains("- likes tea"));
    }
}
