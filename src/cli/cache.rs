//! CLI `cache` commands: inspect or delete the on-disk embedding cache.

use anyhow::Result;

use docent::cache::{EmbeddingCache, CACHE_VERSION};
use docent::config::DocentConfig;

/// Print a summary of the embedding cache file.
pub async fn info(config: &DocentConfig) -> Result<()> {
    let cache = EmbeddingCache::new(config.resolved_cache_dir());

    let Some(info) = cache.info().await else {
        println!("Embedding cache: not found at {}", cache.path().display());
        println!("Run `docent reindex` or any semantic search to build it.");
        return Ok(());
    };

    let max_age = config.embedding.max_age();

    println!("docent Embedding Cache");
    println!("======================");
    println!();
    println!("File:              {}", info.path.display());
    println!("File size:         {}", super::format_bytes(info.file_size));
    println!("Version:           {}", info.version);
    println!("Written:           {}", info.timestamp.to_rfc3339());
    println!("Age:               {:.1}h", info.age.num_seconds() as f64 / 3600.0);
    println!("Articles:          {}", info.article_count);
    println!("Embeddings:        {}", info.embedding_count);
    println!();
    if !info.is_current_version() {
        println!("Status:            STALE (version {}, expected {CACHE_VERSION})", info.version);
    } else if info.age > max_age {
        println!(
            "Status:            EXPIRED (older than {}h)",
            config.embedding.max_age_hours
        );
    } else {
        println!("Status:            OK");
    }

    Ok(())
}

/// Delete the embedding cache file.
pub async fn clear(config: &DocentConfig) -> Result<()> {
    let cache = EmbeddingCache::new(config.resolved_cache_dir());
    if cache.clear().await? {
        println!("Deleted {}", cache.path().display());
    } else {
        println!("No cache file at {}", cache.path().display());
    }
    Ok(())
}
