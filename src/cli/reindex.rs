//! CLI `reindex` command: drop cached embeddings, re-crawl and rebuild the index.

use anyhow::Result;

use crate::server::setup_shared_state;
use docent::config::DocentConfig;
use docent::search::semantic::IndexSource;

pub async fn reindex(config: &DocentConfig) -> Result<()> {
    let state = setup_shared_state(config)?;
    if !state.docs.has_semantic_index() {
        println!("Semantic search is not configured; only the article list will be refreshed.");
    }

    let pb = super::spinner("Crawling and indexing articles...");
    let report = state.docs.reindex().await;
    pb.finish_and_clear();
    let report = report?;

    if report.cache_cleared {
        println!("Removed previous embedding cache.");
    }
    println!("Articles crawled:  {}", report.articles);

    if let Some(summary) = report.index {
        let source = match summary.source {
            IndexSource::Cache => "cache",
            IndexSource::Computed => "computed",
        };
        println!("Embeddings:        {} ({source})", summary.embedded);
        if summary.skipped > 0 {
            println!("Skipped:           {} (embedding failed)", summary.skipped);
        }
    }

    if let Some(info) = state.docs.cache_info().await {
        println!("{}", info.summary());
    }

    Ok(())
}
