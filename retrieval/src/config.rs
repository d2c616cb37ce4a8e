//! Configuration for the retrieval facade.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file,
//! environment variables, and finally whatever the caller sets explicitly.
//!
//! ```toml
//! cache_dir = ".cache/embeddings"
//! top_k = 5
//!
//! [embedding]
//! model = "sentence-transformer"
//!
//! [embedding.openai]
//! model = "text-embedding-3-small"
//!
//! [embedding.local]
//! model = "all-MiniLM-L6-v2"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use embedrank_embeddings::{DEFAULT_LOCAL_MODEL, DEFAULT_TOP_K, EmbeddingModel, OpenAIProvider};

use crate::error::{Result, RetrievalError};

/// Selects the embedding backend.
pub const ENV_MODEL: &str = "EMBEDRANK_MODEL";
/// Directory for cache files.
pub const ENV_CACHE_DIR: &str = "EMBEDRANK_CACHE_DIR";
/// OpenAI API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// OpenAI-compatible API base URL.
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";

/// Configuration for the retrieval facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Directory holding `embeddings_<model>_<key>.json` files.
    pub cache_dir: PathBuf,

    /// Number of results returned by a query.
    pub top_k: usize,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
            top_k: DEFAULT_TOP_K,
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        toml::from_str(content).map_err(|source| RetrievalError::ConfigParse {
            path: origin.into(),
            source,
        })
    }

    /// Load a configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).await?;
        Self::from_toml_str(&content, path)
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps variable names to values.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(model) = lookup(ENV_MODEL) {
            self.embedding.model = model.parse()?;
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(ENV_OPENAI_API_KEY).filter(|key| !key.is_empty()) {
            self.embedding.openai.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_OPENAI_BASE_URL) {
            self.embedding.openai.base_url = url;
        }
        Ok(self)
    }

    /// Set the embedding model family.
    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.embedding.model = model;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the number of results per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be at least 1".to_string()));
        }
        if self.embedding.openai.model.is_empty() {
            return Err(RetrievalError::Config(
                "embedding.openai.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub model: EmbeddingModel,

    /// Settings for the OpenAI provider.
    pub openai: OpenAIConfig,

    /// Settings for the local provider.
    pub local: LocalConfig,
}

/// Settings for the OpenAI provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Remote model name.
    pub model: String,

    /// API base URL.
    pub base_url: String,

    /// API key. Never read from or written to config files.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            model: OpenAIProvider::DEFAULT_MODEL.to_string(),
            base_url: OpenAIProvider::DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Settings for the local provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Local model name.
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LOCAL_MODEL.to_string(),
        }
    }
}
