pub mod deep_research;
pub mod search_memory;
pub mod store_memory;

use deep_research::DeepResearchParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_memory::SearchMemoryParams;
use std::sync::Arc;
use store_memory::StoreMemoryParams;

use deepmem::config::DeepMemConfig;
use deepmem::llm::OpenAiClient;
use deepmem::memory::mem0::Mem0Client;
use deepmem::memory::progressive::ThresholdSequence;
use deepmem::memory::search::search_with_fallback;
use deepmem::research::{Plan, ResearchLoop, ResearchReport};

/// The deepmem MCP tool handler. Holds the memory store client, the optional
/// reasoning client, and config, and exposes all MCP tools via the
/// `#[tool_router]` macro.
#[derive(Clone)]
pub struct DeepMemTools {
    tool_router: ToolRouter<Self>,
    store: Arc<Mem0Client>,
    llm: Option<Arc<OpenAiClient>>,
    config: Arc<DeepMemConfig>,
}

#[derive(serde::Serialize)]
struct DeepResearchResponse<'a> {
    report: &'a ResearchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
}

#[tool_router]
impl DeepMemTools {
    pub fn new(
        store: Arc<Mem0Client>,
        llm: Option<Arc<OpenAiClient>>,
        config: Arc<DeepMemConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
            llm,
            config,
        }
    }

    /// Search memories with progressively lower similarity thresholds.
    #[tool(description = "Search memories by natural language query. Tries decreasing similarity thresholds and falls back to plain text matching if none match.")]
    async fn search_memory(
        &self,
        Parameters(params): Parameters<SearchMemoryParams>,
    ) -> Result<String, String> {
        if params.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }

        let mut policy = self
            .config
            .search_policy()
            .map_err(|e| format!("invalid search config: {e:#}"))?;
        if let Some(thresholds) = params.thresholds {
            policy.thresholds = ThresholdSequence::new(thresholds).map_err(|e| e.to_string())?;
        }

        let scope = self.config.scope_for(params.user_id.as_deref());
        tracing::info!(query = %params.query, user = ?scope.user_id, "search_memory called");

        let outcome = search_with_fallback(self.store.as_ref(), &params.query, &scope, &policy)
            .await
            .map_err(|e| format!("search failed: {e}"))?;

        serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Run a bounded plan, search, and observe research session. A client
    /// cancellation of this request ends the session at the next iteration.
    #[tool(description = "Research a question across stored memories. Iteratively plans sub-queries, searches, and analyzes results until done or the iteration limit is reached.")]
    async fn deep_research(
        &self,
        Parameters(params): Parameters<DeepResearchParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<String, String> {
        let llm = self
            .llm
            .as_deref()
            .ok_or("deep_research requires an LLM API key (OPENAI_API_KEY)")?;

        if params.query.trim().is_empty() {
            return Err("query must not be empty".into());
        }

        let mut settings = self
            .config
            .research_settings()
            .map_err(|e| format!("invalid research config: {e:#}"))?;
        if let Some(requested) = params.max_iterations {
            settings.max_iterations = requested.clamp(1, settings.max_iterations);
        }

        let scope = self.config.scope_for(params.user_id.as_deref());
        tracing::info!(
            query = %params.query,
            max_iterations = settings.max_iterations,
            "deep_research called"
        );

        let research = ResearchLoop::new(self.store.as_ref(), llm, llm, settings)
            .map_err(|e| e.to_string())?;
        let report = research
            .run(&params.query, &scope, Plan::empty(), &ctx.ct)
            .await
            .map_err(|e| format!("research failed: {e}"))?;

        let answer = if params.synthesize.unwrap_or(false) {
            Some(
                llm.synthesize(&report)
                    .await
                    .map_err(|e| format!("synthesis failed: {e}"))?,
            )
        } else {
            None
        };

        serde_json::to_string(&DeepResearchResponse {
            report: &report,
            answer,
        })
        .map_err(|e| format!("serialization failed: {e}"))
    }

    /// Store new content in the memory store.
    #[tool(description = "Store a new memory. The memory service extracts facts from the content and may merge them with existing memories.")]
    async fn store_memory(
        &self,
        Parameters(params): Parameters<StoreMemoryParams>,
    ) -> Result<String, String> {
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }

        let mut scope = self.config.scope_for(params.user_id.as_deref());
        if let Some(metadata) = params.metadata {
            scope.metadata.extend(metadata);
        }

        tracing::info!(content_len = params.content.len(), user = ?scope.user_id, "store_memory called");

        let added = self
            .store
            .add(&params.content, &scope)
            .await
            .map_err(|e| format!("store failed: {e}"))?;

        tracing::info!(count = added.len(), "memory stored");
        serde_json::to_string(&added).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for DeepMemTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "deepmem searches and researches a long-term memory store. Use search_memory \
                 for a single lookup, deep_research for multi-step questions, and store_memory \
                 to save new information."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
