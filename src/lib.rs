//! Deep memory research for AI agents.
//!
//! deepmem searches a hosted long-term memory store (mem0) with a
//! progressive-threshold policy and runs bounded, model-guided research
//! sessions over it:
//!
//! 1. **Progressive search** tries a strictly descending sequence of similarity
//!    thresholds, one remote search per threshold, and stops at the first that
//!    matches anything.
//! 2. **Text fallback** runs when every threshold comes back empty: a bounded
//!    bulk retrieval filtered by case-insensitive substring match.
//! 3. **Research loop** alternates planning, searching, and observing until the
//!    observer is satisfied or a hard iteration cap is reached.
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`error`]: the core error type
//! - [`memory`]: the store trait, the mem0 client, progressive search, and the fallback
//! - [`research`]: plans, observations, bounded context, and the loop controller
//! - [`llm`]: OpenAI-compatible planner, observer, and answer synthesis

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod research;

pub use error::{Error, Result};
