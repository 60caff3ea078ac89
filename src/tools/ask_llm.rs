//! MCP `ask_llm` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `ask_llm` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskLlmParams {
    #[schemars(description = "The question or prompt to send to the LLM")]
    pub prompt: String,

    /// Optional system prompt. Serialized as `systemPrompt` on the wire.
    #[serde(rename = "systemPrompt", default)]
    #[schemars(description = "Optional system prompt to set context or instructions for the LLM")]
    pub system_prompt: Option<String>,
}
