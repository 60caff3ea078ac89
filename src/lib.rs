//! Documentation search for AI agents, served over MCP.
//!
//! docent is an [MCP](https://modelcontextprotocol.io/) server that crawls a help-center
//! site into a normalized article set and answers questions about it. Queries are ranked
//! by vector similarity when an LLM is available and by keyword heuristics otherwise.
//!
//! | Layer | Lifetime | Storage |
//! |-------|----------|---------|
//! | **Crawl cache** | 1 hour | In memory |
//! | **Embedding cache** | 24 hours, or until the article set changes | `cache/embeddings_cache.json` |
//!
//! # Architecture
//!
//! - **Crawling**: `reqwest` + `scraper` over the help index and each article page
//! - **Embeddings**: LLM-extracted key concepts projected onto a 128-dimension vector
//! - **Search**: cosine similarity with a keyword-ranking fallback
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP/SSE
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`docs`]: article types, the help-center crawler and the search service
//! - [`embedding`]: text-to-vector embedding via concept extraction
//! - [`cache`]: versioned on-disk embedding cache
//! - [`search`]: keyword ranking and the semantic index
//! - [`llm`]: chat-completion clients for Ollama, OpenRouter and Groq

pub mod cache;
pub mod config;
pub mod docs;
pub mod embedding;
pub mod llm;
pub mod search;
