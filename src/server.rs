//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire up the memory
//! store client, the reasoning client, and the MCP tool handler into a running server.

use deepmem::config::DeepMemConfig;
use deepmem::llm::OpenAiClient;
use deepmem::memory::mem0::Mem0Client;
use crate::tools::DeepMemTools;
use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::Arc;

/// Shared setup: build the memory client (required) and the LLM client
/// (optional; only `deep_research` needs it).
fn setup_shared_state(
    config: DeepMemConfig,
) -> Result<(Arc<Mem0Client>, Option<Arc<OpenAiClient>>, Arc<DeepMemConfig>)> {
    let store = config.memory_client()?;
    tracing::info!(base_url = %config.memory.base_url, "memory store client ready");

    let llm = match OpenAiClient::new(&config.llm) {
        Ok(client) => {
            tracing::info!(model = %client.model(), "reasoning client ready");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "reasoning client unavailable, deep_research disabled");
            None
        }
    };

    Ok((Arc::new(store), llm, Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: DeepMemConfig) -> Result<()> {
    tracing::info!("starting deepmem MCP server on stdio");

    let (store, llm, config) = setup_shared_state(config)?;

    let tools = DeepMemTools::new(store, llm, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: DeepMemConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting deepmem MCP server on SSE/HTTP");

    let (store, llm, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(DeepMemTools::new(store.clone(), llm.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down SSE server");
        })
        .await?;

    Ok(())
}
