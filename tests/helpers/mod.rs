#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docent::cache::EmbeddingCache;
use docent::docs::{Article, ArticleSource, CrawlError, DocumentationService};
use docent::embedding::concept::ConceptEmbeddingProvider;
use docent::embedding::EMBEDDING_DIM;
use docent::llm::{ChatCompletion, ChatMessage, LlmError};
use docent::search::SemanticIndex;

/// The two-article corpus used across the integration tests.
pub fn fixture_articles() -> Vec<Article> {
    vec![
        Article::new(
            "Invoices 101",
            "https://buildertrend.com/help-articles/invoices-101",
            "Create and send invoices",
        ),
        Article::new(
            "Payroll Setup",
            "https://buildertrend.com/help-articles/payroll-setup",
            "Configure pay periods",
        ),
    ]
}

/// Deterministic 128-dim embedding with a spike at position `seed`.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = 1.0;
    v
}

/// Chat model stand-in that "extracts concepts" by echoing the words of the text it
/// was given. Identical texts therefore embed identically. Counts every call.
#[derive(Default)]
pub struct EchoConcepts {
    calls: AtomicUsize,
    fail: bool,
    fail_on: Option<String>,
}

impl EchoConcepts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A model whose every request fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// A model that fails only prompts containing `marker`.
    pub fn failing_on(marker: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(marker.to_string()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for EchoConcepts {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = &messages[messages.len() - 1].content;
        let marked = self.fail_on.as_deref().is_some_and(|m| prompt.contains(m));
        if self.fail || marked {
            return Err(LlmError::Response("model offline".into()));
        }
        let text = prompt
            .split_once("comma-separated words: ")
            .map(|(_, t)| t)
            .unwrap_or(prompt);
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        Ok(words.join(", "))
    }
}

/// A semantic index over `cache_dir` driven by `llm`, with a 24h cache age.
pub fn concept_index(cache_dir: &Path, llm: Arc<dyn ChatCompletion>) -> SemanticIndex {
    SemanticIndex::new(
        Arc::new(ConceptEmbeddingProvider::new(llm)),
        EmbeddingCache::new(cache_dir),
        chrono::Duration::hours(24),
    )
}

/// Scripted article source. Each crawl pops the next scripted response; once the
/// script runs out the last response repeats.
pub struct FixedSource {
    script: Mutex<VecDeque<Option<Vec<Article>>>>,
    last: Mutex<Option<Vec<Article>>>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(articles: Vec<Article>) -> Arc<Self> {
        Self::scripted(vec![Some(articles)])
    }

    /// `None` entries make that crawl fail.
    pub fn scripted(script: Vec<Option<Vec<Article>>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for FixedSource {
    async fn fetch_articles(&self) -> Result<Vec<Article>, CrawlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let response = match next {
            Some(r) => {
                *self.last.lock().unwrap() = r.clone();
                r
            }
            None => self.last.lock().unwrap().clone(),
        };
        response.ok_or_else(crawl_failure)
    }
}

fn crawl_failure() -> CrawlError {
    CrawlError::InvalidBaseUrl {
        url: "unreachable".into(),
        source: url::Url::parse("unreachable").unwrap_err(),
    }
}

/// Keyword-only service over `source` with an hour-long crawl TTL.
pub fn keyword_service(source: Arc<FixedSource>) -> DocumentationService {
    DocumentationService::new(source, Duration::from_secs(3600), 5)
}
