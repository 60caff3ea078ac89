//! Concept-projection embedding provider.
//!
//! Asks the chat model for a handful of key concepts and projects them with
//! [`concepts_to_embedding`]. This is a cheap, reproducible stand-in for a real
//! embedding model: semantically weak, but stable and free of any embedding API.

use std::sync::Arc;

use async_trait::async_trait;

use super::{concept_tokens, concepts_to_embedding, EmbedError, EmbeddingProvider};
use crate::docs::types::truncate_chars;
use crate::llm::ChatCompletion;

/// Input is cut to this many characters before it reaches the model.
const MAX_INPUT_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "You are a text analysis assistant. Extract only the key concepts as comma-separated words, nothing else.";

pub struct ConceptEmbeddingProvider {
    llm: Arc<dyn ChatCompletion>,
}

impl ConceptEmbeddingProvider {
    pub fn new(llm: Arc<dyn ChatCompletion>) -> Self {
        Self { llm }
    }
}

pub fn concept_prompt(text: &str) -> String {
    format!(
        "Extract 5 key semantic concepts from this text as comma-separated words: {}",
        truncate_chars(text, MAX_INPUT_CHARS)
    )
}

#[async_trait]
impl EmbeddingProvider for ConceptEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let concepts = self
            .llm
            .ask(&concept_prompt(text), Some(SYSTEM_PROMPT))
            .await?;

        if concept_tokens(&concepts) == 0 {
            return Err(EmbedError::NoConcepts);
        }

        tracing::trace!(concepts = %concepts.trim(), "extracted concepts");
        Ok(concepts_to_embedding(&concepts))
    }
}
