mod cli;
mod server;
mod tools;

use anyhow::Result;
use deepmem::config;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deepmem", version, about = "Progressive memory search and deep research for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Transport to use: "stdio" or "sse" (defaults to config)
        #[arg(long)]
        transport: Option<String>,
    },
    /// Search memories with progressive thresholds and text fallback
    Search {
        query: String,
        /// User whose memories to search (defaults to config)
        #[arg(long)]
        user: Option<String>,
    },
    /// Run a multi-step research session over stored memories
    Research {
        query: String,
        #[arg(long)]
        user: Option<String>,
        /// Override the configured iteration cap
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Ask the model for a final prose answer
        #[arg(long)]
        synthesize: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store new content in the memory service
    Remember {
        content: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the resolved configuration and check it
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let mut config = config::DeepMemConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Serve { transport } => {
            if let Some(transport) = transport {
                config.server.transport = transport;
            }
            config.validate()?;
            match config.server.transport.as_str() {
                "sse" => server::serve_sse(config).await?,
                _ => server::serve_stdio(config).await?,
            }
        }
        Command::Search { query, user } => {
            config.validate()?;
            cli::search::search(&config, &query, user.as_deref()).await?;
        }
        Command::Research {
            query,
            user,
            max_iterations,
            synthesize,
            json,
        } => {
            config.validate()?;
            cli::research::research(
                &config,
                cli::research::ResearchArgs {
                    query: &query,
                    user_id: user.as_deref(),
                    max_iterations,
                    synthesize,
                    json,
                },
            )
            .await?;
        }
        Command::Remember { content, user } => {
            config.validate()?;
            cli::remember::remember(&config, &content, user.as_deref()).await?;
        }
    }

    Ok(())
}
