//! MCP `search_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_memory` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoryParams {
    /// Natural language query.
    #[schemars(description = "Natural language query to search memories")]
    pub query: String,

    /// User whose memories to search. Defaults to the configured user.
    #[schemars(description = "User whose memories to search. Defaults to the configured user.")]
    pub user_id: Option<String>,

    /// Override the similarity thresholds, strictly descending.
    #[schemars(
        description = "Similarity thresholds to try in order, strictly descending (e.g. [0.5, 0.4, 0.3]). Defaults to the configured sequence."
    )]
    pub thresholds: Option<Vec<f64>>,
}
