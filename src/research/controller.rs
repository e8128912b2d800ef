//! Research loop state machine.
//!
//! ```text
//! Planning ──> Searching ──> Observing ──┬──> Planning
//!     │                                  └──> Done
//!     └──> Done (cancelled)
//! ```
//!
//! The iteration cap is enforced here regardless of what the observer says.
//! Cancellation is checked only on entry to `Planning`, never mid-call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::context::{ResearchContext, ResearchStep};
use super::plan::{Observation, Plan};
use super::{Observer, Planner};
use crate::error::{Error, Result};
use crate::memory::search::{search_with_fallback, SearchOutcome, SearchPolicy};
use crate::memory::types::ScopeFilter;
use crate::memory::MemoryStore;

/// Immutable loop configuration.
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    /// Hard cap on search iterations. Must be at least 1.
    pub max_iterations: usize,
    /// Query used when planning yields nothing usable. `None` or blank means
    /// reuse the session's original query.
    pub default_query: Option<String>,
    /// Byte budget for the context handed to the planner.
    pub max_context_bytes: usize,
    pub search: SearchPolicy,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            default_query: None,
            max_context_bytes: 8000,
            search: SearchPolicy::default(),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The observer decided no further research was needed.
    ObserverDone,
    /// `max_iterations` searches were run.
    IterationLimit,
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ObserverDone => "observer_done",
            Self::IterationLimit => "iteration_limit",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Everything a finished session produced.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub session_id: Uuid,
    pub query: String,
    /// Research question from the most recent plan, if the planner gave one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub research_question: String,
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Non-empty insights from every iteration, in order.
    pub insights: Vec<String>,
    /// Steps still in the bounded context at the end of the session.
    pub steps: Vec<ResearchStep>,
    /// Steps dropped from the context to stay within budget.
    pub evicted_steps: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

enum LoopState {
    Planning,
    Searching { query: String },
    Observing { query: String, outcome: SearchOutcome },
    Done(StopReason),
}

/// One research session runner. Borrows its collaborators; cheap to build
/// per request.
pub struct ResearchLoop<'a, S, P, O> {
    store: &'a S,
    planner: &'a P,
    observer: &'a O,
    settings: ResearchSettings,
}

impl<'a, S, P, O> ResearchLoop<'a, S, P, O>
where
    S: MemoryStore,
    P: Planner,
    O: Observer,
{
    pub fn new(
        store: &'a S,
        planner: &'a P,
        observer: &'a O,
        settings: ResearchSettings,
    ) -> Result<Self> {
        if settings.max_iterations == 0 {
            return Err(Error::invalid_config("max_iterations must be at least 1"));
        }
        Ok(Self {
            store,
            planner,
            observer,
            settings,
        })
    }

    pub fn settings(&self) -> &ResearchSettings {
        &self.settings
    }

    /// Run a session with no seed plan; the planner is consulted first.
    pub async fn run_planned(&self, query: &str, scope: &ScopeFilter) -> Result<ResearchReport> {
        self.run(query, scope, Plan::empty(), &CancellationToken::new())
            .await
    }

    /// Run a session to completion, starting from `seed`.
    ///
    /// Returns `Err` only for remote failures. A cancelled token ends the
    /// session with [`StopReason::Cancelled`].
    pub async fn run(
        &self,
        query: &str,
        scope: &ScopeFilter,
        seed: Plan,
        cancel: &CancellationToken,
    ) -> Result<ResearchReport> {
        let session_id = Uuid::now_v7();
        let started_at = Utc::now();
        tracing::info!(%session_id, query, max_iterations = self.settings.max_iterations, "research session started");

        let mut plan = seed;
        let mut research_question = plan.research_question.clone();
        let mut context = ResearchContext::new(self.settings.max_context_bytes);
        let mut insights = Vec::new();
        let mut iterations = 0;
        let mut state = LoopState::Planning;

        let stop_reason = loop {
            state = match state {
                LoopState::Done(reason) => break reason,

                LoopState::Planning => {
                    if cancel.is_cancelled() {
                        LoopState::Done(StopReason::Cancelled)
                    } else {
                        let next = self.next_query(query, &mut plan, &context).await?;
                        if !plan.research_question.is_empty() {
                            research_question.clone_from(&plan.research_question);
                        }
                        LoopState::Searching { query: next }
                    }
                }

                LoopState::Searching { query: sub_query } => {
                    iterations += 1;
                    tracing::info!(%session_id, iteration = iterations, query = %sub_query, "research iteration");
                    let outcome =
                        search_with_fallback(self.store, &sub_query, scope, &self.settings.search)
                            .await?;
                    LoopState::Observing {
                        query: sub_query,
                        outcome,
                    }
                }

                LoopState::Observing {
                    query: sub_query,
                    outcome,
                } => {
                    let observation = self
                        .observer
                        .observe(&outcome, &sub_query)
                        .await?
                        .or_fallback("observation", Observation::halt);
                    let keep_going = observation.continue_research;

                    if !observation.insights.trim().is_empty() {
                        insights.push(observation.insights.clone());
                    }
                    context.push(ResearchStep {
                        iteration: iterations,
                        query: sub_query,
                        outcome,
                        observation,
                    });

                    if !keep_going {
                        LoopState::Done(StopReason::ObserverDone)
                    } else if iterations >= self.settings.max_iterations {
                        LoopState::Done(StopReason::IterationLimit)
                    } else {
                        LoopState::Planning
                    }
                }
            };
        };

        tracing::info!(%session_id, iterations, %stop_reason, "research session finished");

        let evicted_steps = context.evicted();
        Ok(ResearchReport {
            session_id,
            query: query.to_string(),
            research_question,
            iterations,
            stop_reason,
            insights,
            steps: context.into_steps(),
            evicted_steps,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Next pending sub-query; when the plan runs dry, ask the planner for a
    /// new one; when that yields nothing, fall back to the default query.
    async fn next_query(
        &self,
        query: &str,
        plan: &mut Plan,
        context: &ResearchContext,
    ) -> Result<String> {
        if let Some(next) = plan.next_query() {
            return Ok(next);
        }

        *plan = self
            .planner
            .plan_next(query, context)
            .await?
            .or_fallback("plan", Plan::empty);

        if let Some(next) = plan.next_query() {
            return Ok(next);
        }

        let fallback = self
            .settings
            .default_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(query);
        tracing::warn!(query = fallback, "plan produced no usable query, using default");
        Ok(fallback.to_string())
    }
}
