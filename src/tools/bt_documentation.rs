//! MCP `bt_documentation` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `bt_documentation` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BtDocumentationParams {
    /// Natural-language question or keywords.
    #[schemars(
        description = "The search query or question to find relevant BuilderTrend help articles"
    )]
    pub query: String,
}
