//! On-disk embedding cache.
//!
//! A single JSON file holding a [`CacheEntry`]: the schema version, the write time,
//! the URL→vector map and the article snapshot it was computed from. Writes replace
//! the whole file (temp file + rename); loads validate version, age and vector shape
//! and report any problem as a [`MissReason`] rather than an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::docs::types::Article;
use crate::embedding::EMBEDDING_DIM;

/// Bump whenever the file layout or the vector projection changes.
pub const CACHE_VERSION: u32 = 3;

pub const CACHE_FILE_NAME: &str = "embeddings_cache.json";

/// The persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub article_count: usize,
    pub embeddings: HashMap<String, Vec<f32>>,
    pub articles: Vec<Article>,
}

impl CacheEntry {
    pub fn new(embeddings: HashMap<String, Vec<f32>>, articles: Vec<Article>) -> Self {
        Self {
            version: CACHE_VERSION,
            timestamp: Utc::now(),
            article_count: articles.len(),
            embeddings,
            articles,
        }
    }
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// A validated cache hit.
#[derive(Debug)]
pub struct CachedIndex {
    pub embeddings: HashMap<String, Vec<f32>>,
    pub articles: Vec<Article>,
    pub age: chrono::Duration,
}

/// Why a load produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum MissReason {
    NotFound,
    Unreadable(String),
    Corrupt(String),
    VersionMismatch { found: u32, expected: u32 },
    Expired { age: chrono::Duration },
    DimensionMismatch { url: String, len: usize },
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("no cache file"),
            Self::Unreadable(e) => write!(f, "cache file unreadable: {e}"),
            Self::Corrupt(e) => write!(f, "cache file corrupt: {e}"),
            Self::VersionMismatch { found, expected } => {
                write!(f, "cache version mismatch (found {found}, expected {expected})")
            }
            Self::Expired { age } => write!(f, "cache expired ({:.1}h old)", hours(*age)),
            Self::DimensionMismatch { url, len } => {
                write!(f, "embedding for {url} has {len} dimensions, expected {EMBEDDING_DIM}")
            }
        }
    }
}

#[derive(Debug)]
pub enum CacheLoad {
    Hit(CachedIndex),
    Miss(MissReason),
}

/// Read-only summary for diagnostics.
#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub age: chrono::Duration,
    pub article_count: usize,
    pub embedding_count: usize,
}

impl CacheInfo {
    pub fn summary(&self) -> String {
        format!(
            "Cache: {} embeddings, {} articles, {:.1}h old, {:.2} MB",
            self.embedding_count,
            self.article_count,
            hours(self.age),
            self.file_size as f64 / (1024.0 * 1024.0)
        )
    }

    pub fn is_current_version(&self) -> bool {
        self.version == CACHE_VERSION
    }
}

fn hours(d: chrono::Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    path: PathBuf,
}

impl EmbeddingCache {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the cache with the current embeddings and articles.
    pub async fn save(
        &self,
        embeddings: &HashMap<String, Vec<f32>>,
        articles: &[Article],
    ) -> Result<()> {
        let entry = CacheEntry::new(embeddings.clone(), articles.to_vec());
        self.write_entry(&entry).await?;
        info!(
            embeddings = embeddings.len(),
            path = %self.path.display(),
            "saved embedding cache"
        );
        Ok(())
    }

    /// Write `entry` verbatim. Uses a temp file + rename so a failed write never
    /// clobbers the previous file.
    pub async fn write_entry(&self, entry: &CacheEntry) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create cache dir: {}", dir.display()))?;
        }

        let json = serde_json::to_vec_pretty(entry).context("failed to serialize cache")?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json)
            .await
            .with_context(|| format!("failed to write temp file: {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .context("failed to rename temp cache file")?;
        Ok(())
    }

    /// Load and validate the cache. Anything but a fresh, current-version, well-formed
    /// file is a [`CacheLoad::Miss`].
    pub async fn load(&self, max_age: chrono::Duration) -> CacheLoad {
        let miss = |reason: MissReason| {
            info!(path = %self.path.display(), %reason, "embedding cache miss");
            CacheLoad::Miss(reason)
        };

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return miss(MissReason::NotFound)
            }
            Err(e) => return miss(MissReason::Unreadable(e.to_string())),
        };

        let header: VersionHeader = match serde_json::from_slice(&bytes) {
            Ok(p) => p,
            Err(e) => return miss(MissReason::Corrupt(e.to_string())),
        };
        if header.version != CACHE_VERSION {
            return miss(MissReason::VersionMismatch {
                found: header.version,
                expected: CACHE_VERSION,
            });
        }

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(e) => e,
            Err(e) => return miss(MissReason::Corrupt(e.to_string())),
        };

        let age = Utc::now() - entry.timestamp;
        if age > max_age {
            return miss(MissReason::Expired { age });
        }

        if let Some((url, v)) = entry
            .embeddings
            .iter()
            .find(|(_, v)| v.len() != EMBEDDING_DIM)
        {
            return miss(MissReason::DimensionMismatch {
                url: url.clone(),
                len: v.len(),
            });
        }

        let known: std::collections::HashSet<&str> =
            entry.articles.iter().map(|a| a.url.as_str()).collect();
        if let Some(orphan) = entry.embeddings.keys().find(|u| !known.contains(u.as_str())) {
            return miss(MissReason::Corrupt(format!(
                "embedding for unknown article {orphan}"
            )));
        }

        info!(
            embeddings = entry.embeddings.len(),
            age_hours = hours(age),
            "loaded embedding cache"
        );

        CacheLoad::Hit(CachedIndex {
            embeddings: entry.embeddings,
            articles: entry.articles,
            age,
        })
    }

    /// Delete the cache file. Returns whether a file was removed.
    pub async fn clear(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "embedding cache cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("failed to delete cache file: {}", self.path.display())),
        }
    }

    /// Summary of the file on disk, or `None` when it is missing or unparseable.
    pub async fn info(&self) -> Option<CacheInfo> {
        let meta = tokio::fs::metadata(&self.path).await.ok()?;
        let bytes = tokio::fs::read(&self.path).await.ok()?;
        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "cache file present but unparseable");
                return None;
            }
        };

        Some(CacheInfo {
            path: self.path.clone(),
            file_size: meta.len(),
            version: entry.version,
            timestamp: entry.timestamp,
            age: Utc::now() - entry.timestamp,
            article_count: entry.article_count,
            embedding_count: entry.embeddings.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_reasons_render() {
        let r = MissReason::VersionMismatch {
            found: 2,
            expected: CACHE_VERSION,
        };
        assert_eq!(
            r.to_string(),
            format!("cache version mismatch (found 2, expected {CACHE_VERSION})")
        );
        let r = MissReason::Expired {
            age: chrono::Duration::minutes(90),
        };
        assert_eq!(r.to_string(), "cache expired (1.5h old)");
    }

    #[test]
    fn info_summary_format() {
        let info = CacheInfo {
            path: PathBuf::from("cache/embeddings_cache.json"),
            file_size: 2 * 1024 * 1024,
            version: CACHE_VERSION,
            timestamp: Utc::now(),
            age: chrono::Duration::hours(3),
            article_count: 40,
            embedding_count: 38,
        };
        assert_eq!(
            info.summary(),
            "Cache: 38 embeddings, 40 articles, 3.0h old, 2.00 MB"
        );
        assert!(info.is_current_version());
    }

    #[test]
    fn entry_records_article_count() {
        let entry = CacheEntry::new(HashMap::new(), vec![Article::new("t", "u", "d")]);
        assert_eq!(entry.version, CACHE_VERSION);
        assert_eq!(entry.article_count, 1);
    }
}
