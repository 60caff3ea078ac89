pub mod ask_llm;
pub mod bt_documentation;
pub mod echo;

use std::sync::Arc;

use ask_llm::AskLlmParams;
use bt_documentation::BtDocumentationParams;
use echo::EchoParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};

use docent::docs::DocumentationService;
use docent::llm::ChatCompletion;

/// The docent MCP tool handler. Holds the shared documentation service and the
/// optional chat model, and exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct DocentTools {
    tool_router: ToolRouter<Self>,
    docs: Arc<DocumentationService>,
    llm: Option<Arc<dyn ChatCompletion>>,
    use_semantic: bool,
}

#[tool_router]
impl DocentTools {
    pub fn new(
        docs: Arc<DocumentationService>,
        llm: Option<Arc<dyn ChatCompletion>>,
        use_semantic: bool,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            docs,
            llm,
            use_semantic,
        }
    }

    /// Search the help-center articles.
    #[tool(description = "Searches BuilderTrend help articles for relevant information based on a query. Returns the top matching articles with URLs and snippets.")]
    async fn bt_documentation(
        &self,
        Parameters(params): Parameters<BtDocumentationParams>,
    ) -> Result<String, String> {
        let query = params.query.trim();
        if query.is_empty() {
            return Err("Query parameter cannot be empty".into());
        }

        tracing::info!(query = %query, "bt_documentation called");
        let outcome = self.docs.search(query, self.use_semantic).await;
        tracing::info!(
            method = %outcome.method,
            results = outcome.results.len(),
            fallback = outcome.fallback_reason.is_some(),
            "documentation search complete"
        );

        Ok(outcome.format(query))
    }

    /// Forward a prompt to the configured chat model.
    #[tool(description = "Ask a question to the configured LLM (AI assistant). Useful for getting AI-generated answers, analysis, or assistance with various tasks.")]
    async fn ask_llm(
        &self,
        Parameters(params): Parameters<AskLlmParams>,
    ) -> Result<String, String> {
        let llm = self
            .llm
            .as_ref()
            .ok_or("LLM service is not configured. Set [llm] provider in config.toml")?;

        if params.prompt.trim().is_empty() {
            return Err("Prompt parameter cannot be empty".into());
        }

        tracing::info!(prompt_len = params.prompt.len(), "ask_llm called");
        let system_prompt = params.system_prompt.as_deref().filter(|s| !s.trim().is_empty());
        llm.ask(&params.prompt, system_prompt)
            .await
            .map_err(|e| format!("LLM request failed: {e}"))
    }

    #[tool(description = "Echoes back the provided message")]
    async fn echo(&self, Parameters(params): Parameters<EchoParams>) -> Result<String, String> {
        Ok(format!("Echo: {}", params.message))
    }

    #[tool(description = "Returns the current server time")]
    async fn get_time(&self) -> Result<String, String> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        Ok(format!("Current server time: {now}"))
    }
}

#[tool_handler]
impl ServerHandler for DocentTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "docent searches the help-center documentation. Use bt_documentation to find \
                 relevant articles and ask_llm to query the configured model."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
