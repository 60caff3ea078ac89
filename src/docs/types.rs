//! Core documentation type definitions.
//!
//! Defines [`Article`] (one crawled help page) and [`SearchResult`] (one ranked hit),
//! plus [`SearchMethod`], which records how a result list was produced.

use serde::{Deserialize, Serialize};

/// A single help-center page. `url` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub description: String,
    /// Visible page text, present only when full-content fetching ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
            full_content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.full_content = Some(content.into());
        self
    }

    /// Full content if non-empty.
    pub fn content(&self) -> Option<&str> {
        self.full_content.as_deref().filter(|c| !c.is_empty())
    }

    /// True when the description carries nothing beyond the link text.
    pub fn has_bootstrap_description(&self) -> bool {
        self.description.trim().is_empty() || self.description == self.title
    }
}

/// A ranked article. Keyword and semantic scores live on different scales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub score: f64,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

/// Ranking method that actually produced a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Semantic,
    Keyword,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Char-safe prefix of `text`, at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
