//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire up the crawler,
//! chat model, semantic index and MCP tool handler into a running server.

use crate::tools::DocentTools;
use anyhow::{Context, Result};
use docent::cache::EmbeddingCache;
use docent::config::DocentConfig;
use docent::docs::{DocumentationService, HelpCenterCrawler};
use docent::embedding::concept::ConceptEmbeddingProvider;
use docent::llm::{self, ChatCompletion};
use docent::search::SemanticIndex;
use rmcp::ServiceExt;
use std::sync::Arc;

/// Long-lived state shared by every tool call and CLI command.
pub struct SharedState {
    pub docs: Arc<DocumentationService>,
    pub llm: Option<Arc<dyn ChatCompletion>>,
}

/// Shared setup: create the chat client, the crawler and the documentation service.
///
/// A chat client that fails to initialize is logged and skipped; documentation
/// search then runs keyword-only.
pub fn setup_shared_state(config: &DocentConfig) -> Result<SharedState> {
    let llm = match llm::create_client(&config.llm) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "could not initialize LLM client, continuing without it");
            None
        }
    };

    let crawler = HelpCenterCrawler::new(&config.docs).context("failed to create crawler")?;
    tracing::info!(base_url = %crawler.base_url(), "crawler ready");

    let mut docs =
        DocumentationService::new(Arc::new(crawler), config.docs.crawl_ttl(), config.retrieval.top_k);

    match (&llm, config.retrieval.semantic) {
        (Some(llm), true) => {
            let cache_dir = config.resolved_cache_dir();
            tracing::info!(cache_dir = %cache_dir.display(), "semantic search enabled");
            let embedder = Arc::new(ConceptEmbeddingProvider::new(Arc::clone(llm)));
            let index = SemanticIndex::new(
                embedder,
                EmbeddingCache::new(cache_dir),
                config.embedding.max_age(),
            );
            docs = docs.with_semantic_index(index);
        }
        (None, true) => {
            tracing::info!("no LLM configured, semantic search disabled");
        }
        (_, false) => {
            tracing::info!("semantic search disabled by config");
        }
    }

    Ok(SharedState {
        docs: Arc::new(docs),
        llm,
    })
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: DocentConfig) -> Result<()> {
    tracing::info!("starting docent MCP server on stdio");

    let state = setup_shared_state(&config)?;

    let tools = DocentTools::new(state.docs, state.llm, config.retrieval.semantic);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: DocentConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting docent MCP server on SSE/HTTP");

    let state = setup_shared_state(&config)?;
    let (docs, llm) = (state.docs, state.llm);
    let use_semantic = config.retrieval.semantic;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(DocentTools::new(docs.clone(), llm.clone(), use_semantic)),
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
