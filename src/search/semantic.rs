//! Semantic search index.
//!
//! Holds the `(articles, embeddings)` pair behind an explicit [`IndexState`]. Indexing
//! adopts a fresh, URL-matching cache file when one exists and otherwise embeds every
//! article and persists the result. Search ranks by cosine similarity rescaled to 0–10.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use super::keyword::keyword_score;
use crate::cache::{CacheInfo, CacheLoad, EmbeddingCache};
use crate::docs::types::{truncate_chars, Article, SearchResult};
use crate::embedding::{cosine_similarity, EmbeddingProvider};

/// Cap on the title + content text sent for embedding.
const MAX_EMBED_TEXT_CHARS: usize = 2000;
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no embeddings could be generated for {attempted} articles")]
    NoEmbeddings { attempted: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("articles not indexed; call index() first")]
    NotIndexed,
}

/// The in-memory corpus once indexing has completed.
#[derive(Debug, Default)]
pub struct IndexedCorpus {
    pub articles: Vec<Article>,
    pub embeddings: HashMap<String, Vec<f32>>,
}

impl IndexedCorpus {
    fn covers(&self, articles: &[Article]) -> bool {
        url_set(&self.articles) == url_set(articles)
    }
}

#[derive(Debug, Default)]
pub enum IndexState {
    #[default]
    Unindexed,
    /// An `index()` call is running, or was dropped before finishing.
    Indexing,
    Indexed(IndexedCorpus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Cache,
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub source: IndexSource,
    pub articles: usize,
    pub embedded: usize,
    pub skipped: usize,
}

pub struct SemanticIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
    max_age: chrono::Duration,
    state: IndexState,
}

impl SemanticIndex {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        cache: EmbeddingCache,
        max_age: chrono::Duration,
    ) -> Self {
        Self {
            embedder,
            cache,
            max_age,
            state: IndexState::Unindexed,
        }
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.state, IndexState::Indexed(_))
    }

    /// True when indexed over exactly the URLs in `articles`.
    pub fn is_indexed_for(&self, articles: &[Article]) -> bool {
        match &self.state {
            IndexState::Indexed(corpus) => corpus.covers(articles),
            _ => false,
        }
    }

    /// Build the index for `articles`, from cache when possible.
    pub async fn index(&mut self, articles: &[Article]) -> Result<IndexSummary, IndexError> {
        self.state = IndexState::Indexing;

        match self.cache.load(self.max_age).await {
            CacheLoad::Hit(cached) => {
                if url_set(&cached.articles) == url_set(articles) {
                    info!(
                        articles = cached.articles.len(),
                        embeddings = cached.embeddings.len(),
                        "using cached embeddings"
                    );
                    let summary = IndexSummary {
                        source: IndexSource::Cache,
                        articles: cached.articles.len(),
                        embedded: cached.embeddings.len(),
                        skipped: cached.articles.len() - cached.embeddings.len(),
                    };
                    self.state = IndexState::Indexed(IndexedCorpus {
                        articles: cached.articles,
                        embeddings: cached.embeddings,
                    });
                    return Ok(summary);
                }
                info!(
                    cached = cached.articles.len(),
                    current = articles.len(),
                    "embedding cache invalid: article list changed"
                );
            }
            CacheLoad::Miss(_) => {}
        }

        info!(articles = articles.len(), "indexing articles");
        let mut embeddings = HashMap::with_capacity(articles.len());
        for article in articles {
            match self.embedder.embed(&embedding_text(article)).await {
                Ok(v) => {
                    embeddings.insert(article.url.clone(), v);
                }
                Err(e) => {
                    warn!(title = %article.title, error = %e, "failed to embed article");
                }
            }
        }

        let summary = IndexSummary {
            source: IndexSource::Computed,
            articles: articles.len(),
            embedded: embeddings.len(),
            skipped: articles.len() - embeddings.len(),
        };
        info!(embedded = summary.embedded, skipped = summary.skipped, "indexing complete");

        if !articles.is_empty() && embeddings.is_empty() {
            self.state = IndexState::Unindexed;
            return Err(IndexError::NoEmbeddings {
                attempted: articles.len(),
            });
        }

        if !articles.is_empty() {
            if let Err(e) = self.cache.save(&embeddings, articles).await {
                warn!(error = %e, "failed to save embedding cache");
            }
        }

        self.state = IndexState::Indexed(IndexedCorpus {
            articles: articles.to_vec(),
            embeddings,
        });
        Ok(summary)
    }

    /// Rank indexed articles against `query`. A query that cannot be embedded yields
    /// an empty list.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, SearchError> {
        let IndexState::Indexed(corpus) = &self.state else {
            return Err(SearchError::NotIndexed);
        };

        let query_embedding = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to embed query");
                return Ok(Vec::new());
            }
        };

        let mut ranked: Vec<(SearchResult, f64)> = corpus
            .articles
            .iter()
            .filter_map(|article| {
                let embedding = corpus.embeddings.get(&article.url)?;
                let similarity = cosine_similarity(&query_embedding, embedding);
                let result = SearchResult {
                    title: article.title.clone(),
                    url: article.url.clone(),
                    score: rescale_similarity(similarity),
                    snippet: semantic_snippet(&article.description),
                    full_content: article.full_content.clone(),
                };
                Some((result, keyword_score(article, query)))
            })
            .collect();

        // Ties on similarity fall back to keyword overlap, then corpus order.
        ranked.sort_by(|(a, a_kw), (b, b_kw)| {
            b.score.total_cmp(&a.score).then_with(|| b_kw.total_cmp(a_kw))
        });

        Ok(ranked.into_iter().take(top_k).map(|(r, _)| r).collect())
    }

    /// Delete the cache file and drop the in-memory index.
    pub async fn clear(&mut self) -> anyhow::Result<bool> {
        self.state = IndexState::Unindexed;
        self.cache.clear().await
    }

    pub async fn cache_info(&self) -> Option<CacheInfo> {
        self.cache.info().await
    }
}

/// Text sent to the embedder: title plus full content (capped) when available,
/// otherwise title plus description.
pub fn embedding_text(article: &Article) -> String {
    match article.content() {
        Some(content) => {
            let text = format!("{}. {}", article.title, content);
            truncate_chars(&text, MAX_EMBED_TEXT_CHARS).to_string()
        }
        None => format!("{}. {}", article.title, article.description),
    }
}

/// Map cosine similarity from `[-1, 1]` onto `[0, 10]`.
pub fn rescale_similarity(similarity: f32) -> f64 {
    ((similarity as f64 + 1.0) * 5.0).clamp(0.0, 10.0)
}

fn semantic_snippet(description: &str) -> String {
    let cut = truncate_chars(description, SNIPPET_CHARS);
    if cut.len() < description.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

fn url_set(articles: &[Article]) -> HashSet<&str> {
    articles.iter().map(|a| a.url.as_str()).collect()
}
