use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DocentConfig {
    pub server: ServerConfig,
    pub docs: DocsConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DocsConfig {
    pub base_url: String,
    pub crawl_ttl_secs: u64,
    pub fetch_full_content: bool,
    pub request_delay_ms: u64,
    pub fetch_timeout_secs: u64,
    pub max_content_chars: usize,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub cache_dir: String,
    pub max_age_hours: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub semantic: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DocentConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://buildertrend.com/help-articles/".into(),
            crawl_ttl_secs: 60 * 60,
            fetch_full_content: true,
            request_delay_ms: 500,
            fetch_timeout_secs: 30,
            max_content_chars: 10_000,
            user_agent: concat!("docent/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            cache_dir: "cache".into(),
            max_age_hours: 24,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            semantic: true,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            model: None,
            api_key: None,
            base_url: None,
            timeout_secs: 120,
        }
    }
}

impl DocsConfig {
    pub fn crawl_ttl(&self) -> Duration {
        Duration::from_secs(self.crawl_ttl_secs)
    }
}

impl EmbeddingConfig {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_age_hours as i64)
    }
}

/// Returns `~/.docent/`
pub fn default_docent_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".docent")
}

/// Returns the default config file path: `~/.docent/config.toml`
pub fn default_config_path() -> PathBuf {
    default_docent_dir().join("config.toml")
}

impl DocentConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DocentConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOCENT_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("DOCENT_BASE_URL") {
            self.docs.base_url = val;
        }
        if let Ok(val) = std::env::var("DOCENT_CACHE_DIR") {
            self.embedding.cache_dir = val;
        }
        if let Ok(val) = std::env::var("DOCENT_LLM_PROVIDER") {
            self.llm.provider = val;
        }
        if let Ok(val) = std::env::var("DOCENT_LLM_MODEL") {
            self.llm.model = Some(val);
        }
        if let Ok(val) = std::env::var("DOCENT_LLM_API_KEY") {
            self.llm.api_key = Some(val);
        }
    }

    /// Resolve the embedding cache directory, expanding `~` if needed.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        expand_tilde(&self.embedding.cache_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DocentConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.docs.crawl_ttl_secs, 3600);
        assert_eq!(config.docs.max_content_chars, 10_000);
        assert_eq!(config.embedding.cache_dir, "cache");
        assert_eq!(config.embedding.max_age_hours, 24);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.provider, "ollama");
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[docs]
base_url = "https://example.com/help/"
fetch_full_content = false

[llm]
provider = "groq"
api_key = "secret"
"#;
        let config: DocentConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.docs.base_url, "https://example.com/help/");
        assert!(!config.docs.fetch_full_content);
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        // defaults still apply for unset fields
        assert_eq!(config.docs.request_delay_ms, 500);
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.retrieval.semantic);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DocentConfig::default();
        std::env::set_var("DOCENT_BASE_URL", "https://docs.example.org/");
        std::env::set_var("DOCENT_CACHE_DIR", "/tmp/docent-cache");
        std::env::set_var("DOCENT_LLM_MODEL", "tiny");

        config.apply_env_overrides();

        assert_eq!(config.docs.base_url, "https://docs.example.org/");
        assert_eq!(config.embedding.cache_dir, "/tmp/docent-cache");
        assert_eq!(config.llm.model.as_deref(), Some("tiny"));

        // Clean up
        std::env::remove_var("DOCENT_BASE_URL");
        std::env::remove_var("DOCENT_CACHE_DIR");
        std::env::remove_var("DOCENT_LLM_MODEL");
    }

    #[test]
    fn expand_tilde_leaves_relative_paths() {
        assert_eq!(expand_tilde("cache"), PathBuf::from("cache"));
        assert_eq!(expand_tilde("/abs/cache"), PathBuf::from("/abs/cache"));
    }
}
