//! Chat-completion capability used for concept extraction and `ask_llm`.
//!
//! The rest of the crate only sees the [`ChatCompletion`] trait; [`http::HttpChatClient`]
//! is the concrete provider client, built from configuration via [`create_client`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Failures surfaced by a chat-completion provider. Never retried internally.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("LLM API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected LLM response shape: {0}")]
    Response(String),
    #[error("LLM is not configured: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A language model that turns an ordered conversation into a single reply.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send `messages` (optionally preceded by a system prompt) and return the reply text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError>;

    /// Single-turn convenience wrapper.
    async fn ask(&self, prompt: &str, system_prompt: Option<&str>) -> Result<String, LlmError> {
        self.complete(&[ChatMessage::user(prompt)], system_prompt)
            .await
    }
}

/// Supported chat providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Local Ollama daemon, no API key.
    Ollama,
    /// OpenRouter, OpenAI-compatible, API key required.
    OpenRouter,
    /// Groq, OpenAI-compatible, API key required.
    Groq,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenRouter => "openrouter",
            Self::Groq => "groq",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434/api/chat",
            Self::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::OpenRouter => "meta-llama/llama-3.2-3b-instruct:free",
            Self::Groq => "llama-3.1-8b-instant",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            _ => Err(format!("unknown LLM provider: {s}")),
        }
    }
}

/// Build the configured chat client. `provider = "none"` yields `Ok(None)`.
pub fn create_client(
    config: &LlmConfig,
) -> Result<Option<std::sync::Arc<dyn ChatCompletion>>, LlmError> {
    if config.provider.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let provider: LlmProvider = config.provider.parse().map_err(LlmError::Config)?;
    let client = http::HttpChatClient::new(provider, config)?;
    Ok(Some(std::sync::Arc::new(client)))
}
