//! Documentation search façade.
//!
//! [`DocumentationService`] owns the short-lived crawl cache and, when an embedder is
//! configured, the [`SemanticIndex`]. Each query makes sure the articles are fresh,
//! (re)indexes when the article set changed, and falls back to keyword ranking when
//! semantic search fails or finds nothing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::crawler::ArticleSource;
use super::types::{Article, SearchMethod, SearchResult};
use crate::cache::CacheInfo;
use crate::search::keyword::rank_by_keyword;
use crate::search::semantic::{IndexSummary, SemanticIndex};

#[derive(Debug, Default)]
struct CrawlCache {
    articles: Vec<Article>,
    fetched_at: Option<Instant>,
}

impl CrawlCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.is_some_and(|t| t.elapsed() < ttl)
    }
}

/// Result of one documentation query, including which method produced it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub method: SearchMethod,
    pub results: Vec<SearchResult>,
    /// Articles available at query time; 0 means the crawl produced nothing.
    pub article_count: usize,
    /// Set when semantic search was attempted and keyword ranking took over.
    pub fallback_reason: Option<String>,
}

impl SearchOutcome {
    fn empty() -> Self {
        Self {
            method: SearchMethod::Keyword,
            results: Vec::new(),
            article_count: 0,
            fallback_reason: None,
        }
    }

    /// Render the outcome as the text returned to MCP clients and the CLI.
    pub fn format(&self, query: &str) -> String {
        if self.article_count == 0 {
            return "No articles found. The help site may be unavailable.".to_string();
        }
        if self.results.is_empty() {
            return format!(
                "No relevant articles found for query: '{query}'\n\nTry rephrasing your question or using different keywords."
            );
        }

        let mut out = format!(
            "Found {} relevant article(s) for '{query}' ({} search):\n\n",
            self.results.len(),
            self.method
        );
        for (i, result) in self.results.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, result.title));
            out.push_str(&format!("   URL: {}\n", result.url));
            out.push_str(&format!("   Relevance Score: {:.2}\n", result.score));
            if !result.snippet.is_empty() {
                out.push_str(&format!("   Summary: {}\n", result.snippet));
            }
            out.push('\n');
        }
        if let Some(reason) = &self.fallback_reason {
            out.push_str(&format!(
                "Note: semantic search unavailable ({reason}); showing keyword matches.\n"
            ));
        }
        out
    }
}

/// What a forced rebuild did.
#[derive(Debug, Clone, Copy)]
pub struct ReindexReport {
    pub articles: usize,
    pub cache_cleared: bool,
    /// `None` when no semantic index is configured.
    pub index: Option<IndexSummary>,
}

pub struct DocumentationService {
    source: Arc<dyn ArticleSource>,
    crawl_ttl: Duration,
    crawl: Mutex<CrawlCache>,
    index: Option<RwLock<SemanticIndex>>,
    top_k: usize,
}

impl DocumentationService {
    pub fn new(source: Arc<dyn ArticleSource>, crawl_ttl: Duration, top_k: usize) -> Self {
        Self {
            source,
            crawl_ttl,
            crawl: Mutex::new(CrawlCache::default()),
            index: None,
            top_k,
        }
    }

    /// Enable semantic search backed by `index`.
    pub fn with_semantic_index(mut self, index: SemanticIndex) -> Self {
        self.index = Some(RwLock::new(index));
        self
    }

    pub fn has_semantic_index(&self) -> bool {
        self.index.is_some()
    }

    /// Current articles, crawling first when the cache is older than the TTL.
    pub async fn articles(&self) -> Vec<Article> {
        self.refresh(false).await
    }

    async fn refresh(&self, force: bool) -> Vec<Article> {
        let mut crawl = self.crawl.lock().await;
        if !force && crawl.is_fresh(self.crawl_ttl) {
            return crawl.articles.clone();
        }

        match self.source.fetch_articles().await {
            Ok(articles) => {
                info!(count = articles.len(), "crawled help articles");
                crawl.articles = articles;
                crawl.fetched_at = Some(Instant::now());
            }
            Err(e) => {
                warn!(
                    error = %e,
                    cached = crawl.articles.len(),
                    "crawl failed, serving previously cached articles"
                );
            }
        }
        crawl.articles.clone()
    }

    /// Answer `query`, preferring semantic ranking when asked for and available.
    pub async fn search(&self, query: &str, use_semantic: bool) -> SearchOutcome {
        let articles = self.articles().await;
        if articles.is_empty() {
            return SearchOutcome::empty();
        }

        let mut fallback_reason = None;
        if let Some(index) = self.index.as_ref().filter(|_| use_semantic) {
            match self.semantic_search(index, &articles, query).await {
                Ok(results) if !results.is_empty() => {
                    return SearchOutcome {
                        method: SearchMethod::Semantic,
                        results,
                        article_count: articles.len(),
                        fallback_reason: None,
                    };
                }
                Ok(_) => {
                    fallback_reason = Some("semantic search returned no results".to_string());
                }
                Err(e) => {
                    warn!(error = %e, "semantic search failed, falling back to keyword search");
                    fallback_reason = Some(format!("{e:#}"));
                }
            }
        }

        let mut results = rank_by_keyword(&articles, query);
        results.truncate(self.top_k);
        SearchOutcome {
            method: SearchMethod::Keyword,
            results,
            article_count: articles.len(),
            fallback_reason,
        }
    }

    async fn semantic_search(
        &self,
        index: &RwLock<SemanticIndex>,
        articles: &[Article],
        query: &str,
    ) -> Result<Vec<SearchResult>> {
        {
            let reader = index.read().await;
            if reader.is_indexed_for(articles) {
                return Ok(reader.search(query, self.top_k).await?);
            }
        }

        // Re-check under the write lock: a concurrent caller may have indexed already.
        let mut writer = index.write().await;
        if !writer.is_indexed_for(articles) {
            writer.index(articles).await?;
        }
        let reader = writer.downgrade();
        Ok(reader.search(query, self.top_k).await?)
    }

    /// Drop the embedding cache and in-memory index, re-crawl, and rebuild.
    pub async fn reindex(&self) -> Result<ReindexReport> {
        let cache_cleared = match &self.index {
            Some(index) => index.write().await.clear().await?,
            None => false,
        };

        let articles = self.refresh(true).await;
        if articles.is_empty() {
            anyhow::bail!("no articles available to index");
        }

        let summary = match &self.index {
            Some(index) => Some(index.write().await.index(&articles).await?),
            None => None,
        };

        Ok(ReindexReport {
            articles: articles.len(),
            cache_cleared,
            index: summary,
        })
    }

    /// On-disk embedding cache summary, when semantic search is configured.
    pub async fn cache_info(&self) -> Option<CacheInfo> {
        match &self.index {
            Some(index) => index.read().await.cache_info().await,
            None => None,
        }
    }
}
