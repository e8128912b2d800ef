//! Chat-model reasoning client.
//!
//! [`OpenAiClient`] implements [`crate::research::Planner`] and
//! [`crate::research::Observer`] over any OpenAI-compatible chat completions
//! endpoint, and can synthesize a final answer from a finished report.

mod openai;
pub mod prompts;

pub use openai::OpenAiClient;
