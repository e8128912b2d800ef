#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use deepmem::memory::progressive::ThresholdSequence;
use deepmem::memory::search::{SearchOutcome, SearchPolicy};
use deepmem::memory::types::{Record, ScopeFilter, SearchResult};
use deepmem::memory::MemoryStore;
use deepmem::research::{Observation, Observer, Parsed, Plan, Planner, ResearchContext};
use deepmem::{Error, Result};
use tokio_util::sync::CancellationToken;

/// A store call as observed by [`FakeStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search { query: String, threshold: f64 },
    GetAll { limit: usize },
}

/// In-process store with fixed records. Both calls honor the scope's metadata
/// constraints. `search` applies the threshold cutoff server-side, like the
/// real service; `get_all` returns every in-scope record unranked in
/// insertion order, ignoring `limit`.
#[derive(Default)]
pub struct FakeStore {
    records: Vec<Record>,
    calls: Mutex<Vec<Call>>,
    fail_search: bool,
}

impl FakeStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Store whose records carry the given scores and texts `r0`, `r1`, ...
    pub fn with_scores(scores: &[f64]) -> Self {
        Self::new(
            scores
                .iter()
                .enumerate()
                .map(|(i, s)| Record::new(format!("id-{i}"), format!("r{i}"), *s))
                .collect(),
        )
    }

    pub fn failing() -> Self {
        Self {
            fail_search: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searched_thresholds(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { threshold, .. } => Some(threshold),
                Call::GetAll { .. } => None,
            })
            .collect()
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { query, .. } => Some(query),
                Call::GetAll { .. } => None,
            })
            .collect()
    }

    pub fn get_all_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetAll { .. }))
            .count()
    }
}

impl MemoryStore for FakeStore {
    async fn search(
        &self,
        query: &str,
        scope: &ScopeFilter,
        threshold: f64,
    ) -> Result<SearchResult> {
        self.calls.lock().unwrap().push(Call::Search {
            query: query.to_string(),
            threshold,
        });
        if self.fail_search {
            return Err(Error::remote("fake search", "connection refused"));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.score >= threshold && scope.admits(r))
            .cloned()
            .collect::<Vec<_>>()
            .into())
    }

    async fn get_all(&self, scope: &ScopeFilter, limit: usize) -> Result<SearchResult> {
        self.calls.lock().unwrap().push(Call::GetAll { limit });
        Ok(self
            .records
            .iter()
            .filter(|r| scope.admits(r))
            .cloned()
            .collect::<Vec<_>>()
            .into())
    }
}

/// Planner that replays scripted replies, then returns empty plans.
pub struct ScriptedPlanner {
    replies: Mutex<VecDeque<Parsed<Plan>>>,
    calls: AtomicUsize,
}

impl ScriptedPlanner {
    pub fn new(replies: Vec<Parsed<Plan>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Planner for ScriptedPlanner {
    async fn plan_next(&self, _query: &str, _context: &ResearchContext) -> Result<Parsed<Plan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| Parsed::Ok(Plan::empty())))
    }
}

/// Planner that always answers with one fixed sub-query.
pub struct RepeatingPlanner {
    pub query: String,
}

impl Planner for RepeatingPlanner {
    async fn plan_next(&self, _query: &str, _context: &ResearchContext) -> Result<Parsed<Plan>> {
        Ok(Parsed::Ok(Plan::new("", vec![self.query.clone()])))
    }
}

/// Planner whose every call is a remote failure.
pub struct FailingPlanner;

impl Planner for FailingPlanner {
    async fn plan_next(&self, _query: &str, _context: &ResearchContext) -> Result<Parsed<Plan>> {
        Err(Error::remote("fake planner", "HTTP 401 Unauthorized"))
    }
}

/// Observer with a fixed continuation decision; records the queries it saw.
pub struct FixedObserver {
    continue_research: bool,
    seen: Mutex<Vec<String>>,
}

impl FixedObserver {
    pub fn always_continue() -> Self {
        Self {
            continue_research: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn stop_immediately() -> Self {
        Self {
            continue_research: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Observer for FixedObserver {
    async fn observe(&self, outcome: &SearchOutcome, query: &str) -> Result<Parsed<Observation>> {
        self.seen.lock().unwrap().push(query.to_string());
        let insights = format!("{} result(s) for {query}", outcome.result().len());
        Ok(Parsed::Ok(Observation {
            insights,
            continue_research: self.continue_research,
        }))
    }
}

/// Observer that always asks to continue but cancels `token` when it runs,
/// as a client would while a search is in flight.
pub struct CancellingObserver {
    pub token: CancellationToken,
}

impl Observer for CancellingObserver {
    async fn observe(&self, _outcome: &SearchOutcome, query: &str) -> Result<Parsed<Observation>> {
        self.token.cancel();
        Ok(Parsed::Ok(Observation {
            insights: format!("saw {query}"),
            continue_research: true,
        }))
    }
}

/// Observer that replays scripted replies, then halts.
pub struct ScriptedObserver {
    replies: Mutex<VecDeque<Parsed<Observation>>>,
}

impl ScriptedObserver {
    pub fn new(replies: Vec<Parsed<Observation>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl Observer for ScriptedObserver {
    async fn observe(&self, _outcome: &SearchOutcome, _query: &str) -> Result<Parsed<Observation>> {
        let reply = self.replies.lock().unwrap().pop_front();
        Ok(reply.unwrap_or_else(|| Parsed::Ok(Observation::halt())))
    }
}

pub fn thresholds(values: &[f64]) -> ThresholdSequence {
    ThresholdSequence::new(values.to_vec()).unwrap()
}

pub fn policy(values: &[f64]) -> SearchPolicy {
    SearchPolicy {
        thresholds: thresholds(values),
        fallback_limit: 100,
    }
}

pub fn scope() -> ScopeFilter {
    ScopeFilter::for_user("test-user")
}
