use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoreMemoryParams {
    #[schemars(description = "The natural language content to remember")]
    pub content: String,

    #[schemars(description = "User this memory belongs to. Defaults to the configured user.")]
    pub user_id: Option<String>,

    #[schemars(description = "Optional JSON object of metadata to attach to the memory")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}
