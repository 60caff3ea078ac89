mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docent::config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docent", version, about = "Help-center documentation search MCP server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio unless configured or flagged for SSE)
    Serve {
        /// Serve Streamable HTTP/SSE instead of stdio
        #[arg(long)]
        sse: bool,
    },
    /// Search the documentation from the terminal
    Search {
        query: String,
        /// Skip semantic search and rank by keywords only
        #[arg(long)]
        keyword: bool,
    },
    /// Search, then ask the LLM to answer from the top articles
    Answer { query: String },
    /// Delete cached embeddings, re-crawl and rebuild the index
    Reindex,
    /// Inspect or clear the embedding cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache file details
    Info,
    /// Delete the cache file
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::DocentConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { sse } => {
            if sse || config.server.transport.eq_ignore_ascii_case("sse") {
                server::serve_sse(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::Search { query, keyword } => {
            cli::search::search(&config, &query, keyword).await?;
        }
        Command::Answer { query } => {
            cli::answer::answer(&config, &query).await?;
        }
        Command::Reindex => {
            cli::reindex::reindex(&config).await?;
        }
        Command::Cache { action } => match action {
            CacheAction::Info => cli::cache::info(&config).await?,
            CacheAction::Clear => cli::cache::clear(&config).await?,
        },
    }

    Ok(())
}
