use anyhow::Result;

use crate::server::setup_shared_state;
use docent::config::DocentConfig;

/// Run a documentation search from the terminal.
pub async fn search(config: &DocentConfig, query: &str, keyword_only: bool) -> Result<()> {
    let query = query.trim();
    anyhow::ensure!(!query.is_empty(), "query must not be empty");

    let state = setup_shared_state(config)?;
    let use_semantic = config.retrieval.semantic && !keyword_only;

    let started = std::time::Instant::now();
    let outcome = state.docs.search(query, use_semantic).await;
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "search finished");

    print!("{}", outcome.format(query));
    Ok(())
}
