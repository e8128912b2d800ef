//! MCP `deep_research` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `deep_research` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeepResearchParams {
    #[schemars(description = "The research question to investigate across stored memories")]
    pub query: String,

    #[schemars(description = "User whose memories to research. Defaults to the configured user.")]
    pub user_id: Option<String>,

    /// Capped at the configured maximum.
    #[schemars(
        description = "Maximum number of search iterations. Cannot exceed the server's configured limit."
    )]
    pub max_iterations: Option<usize>,

    #[schemars(
        description = "If true, return a synthesized prose answer alongside the research report"
    )]
    pub synthesize: Option<bool>,
}
