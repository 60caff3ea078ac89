//! HTTP chat client for Ollama and OpenAI-compatible providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatCompletion, ChatMessage, LlmError, LlmProvider, Role};
use crate::config::LlmConfig;

pub struct HttpChatClient {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpChatClient {
    pub fn new(provider: LlmProvider, config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        if provider.requires_api_key() && api_key.is_none() {
            return Err(LlmError::Config(format!(
                "API key required for provider: {provider}"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_endpoint().to_string());
        let model = config
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        tracing::info!(provider = %provider, model = %model, "chat client ready");

        Ok(Self {
            provider,
            endpoint,
            model,
            api_key,
            client,
        })
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let auth = format!("Bearer {key}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth)
                    .map_err(|_| LlmError::Config("invalid API key".into()))?,
            );
        }
        if self.provider == LlmProvider::OpenRouter {
            headers.insert("X-Title", HeaderValue::from_static("docent"));
        }
        Ok(headers)
    }
}

#[async_trait]
impl ChatCompletion for HttpChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
    ) -> Result<String, LlmError> {
        let mut wire: Vec<WireMessage<'_>> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            wire.push(WireMessage {
                role: Role::System,
                content: system,
            });
        }
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        }));

        // Ollama streams by default; ask for a single JSON body instead.
        let stream = (self.provider == LlmProvider::Ollama).then_some(false);
        let body = ChatRequest {
            model: &self.model,
            messages: wire,
            stream,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let content = match self.provider {
            LlmProvider::Ollama => {
                let parsed: OllamaResponse = resp.json().await?;
                parsed.message.content
            }
            LlmProvider::OpenRouter | LlmProvider::Groq => {
                let parsed: OpenAiResponse = resp.json().await?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| LlmError::Response("no choices in response".into()))?
            }
        };

        tracing::debug!(provider = %self.provider, len = content.len(), "chat completion received");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}
