//! Bounded plan → search → observe research loop.
//!
//! The loop controller lives in [`controller`]. Planning and observation are
//! external reasoning calls, modelled as the [`Planner`] and [`Observer`]
//! traits so tests can drive the state machine with deterministic fakes.
//! [`crate::llm::OpenAiClient`] implements both against a chat model.

pub mod context;
pub mod controller;
pub mod plan;

use std::future::Future;

pub use context::{ResearchContext, ResearchStep};
pub use controller::{ResearchLoop, ResearchReport, ResearchSettings, StopReason};
pub use plan::{Observation, Parsed, Plan};

use crate::error::Result;
use crate::memory::search::SearchOutcome;

/// Produces the next plan from the original query and what has been found.
///
/// An `Err` is a remote failure and aborts the session. Unusable model output
/// must come back as `Ok(Parsed::Malformed { .. })`.
pub trait Planner: Send + Sync {
    fn plan_next(
        &self,
        query: &str,
        context: &ResearchContext,
    ) -> impl Future<Output = Result<Parsed<Plan>>> + Send;
}

/// Judges one search outcome and decides whether research should continue.
pub trait Observer: Send + Sync {
    fn observe(
        &self,
        outcome: &SearchOutcome,
        query: &str,
    ) -> impl Future<Output = Result<Parsed<Observation>>> + Send;
}
