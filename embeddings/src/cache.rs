//! Embedding cache for avoiding redundant provider calls.
//!
//! Results are memoized per batch: the whole list of documents maps to one
//! JSON file named `embeddings_<model>_<key>.json`. There is no partial-hit
//! logic and no eviction; files live until someone deletes them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use crate::DocumentEmbedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::{EmbeddingModel, EmbeddingProvider};

/// Replace newlines with spaces before hashing and embedding.
pub fn normalize_document(document: &str) -> String {
    document.replace('\n', " ")
}

/// Embedding generator that memoizes whole batches to disk.
pub struct CachingEmbeddingGenerator {
    /// Backend used on a cache miss.
    provider: Arc<dyn EmbeddingProvider>,

    /// Directory holding the cache files.
    cache_dir: PathBuf,
}

impl CachingEmbeddingGenerator {
    /// Create a generator that stores cache files in `cache_dir`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            cache_dir: cache_dir.into(),
        }
    }

    /// Model family of the underlying provider.
    pub fn model(&self) -> EmbeddingModel {
        self.provider.kind()
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Directory holding the cache files.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache key for a batch of already-normalized documents.
    ///
    /// Hashes the provider's model id followed by one SHA-256 digest per
    /// document, so batches that only agree after concatenation do not
    /// collide.
    fn key_for(&self, normalized: &[String]) -> String {
        let model = self.provider.model();
        let mut hasher = Sha256::new();
        hasher.update((model.len() as u64).to_le_bytes());
        hasher.update(model.as_bytes());
        for document in normalized {
            hasher.update(Sha256::digest(document.as_bytes()));
        }
        hex::encode(hasher.finalize())
    }

    /// Cache key for a batch of documents.
    pub fn cache_key(&self, documents: &[String]) -> String {
        let normalized: Vec<String> = documents
            .iter()
            .map(String::as_str)
            .map(normalize_document)
            .collect();
        self.key_for(&normalized)
    }

    /// Path of the cache file for a batch of documents.
    pub fn cache_path(&self, documents: &[String]) -> PathBuf {
        self.path_for_key(&self.cache_key(documents))
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        let model = self.model();
        self.cache_dir.join(format!("embeddings_{model}_{key}.json"))
    }

    /// Generate embeddings for `documents`, using the cache file if present.
    pub async fn generate(&self, documents: &[String]) -> Result<Vec<DocumentEmbedding>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let normalized: Vec<String> = documents
            .iter()
            .map(String::as_str)
            .map(normalize_document)
            .collect();
        let path = self.path_for_key(&self.key_for(&normalized));

        if fs::try_exists(&path).await? {
            debug!("Cache hit: {}", path.display());
            return Self::load(&path).await;
        }

        debug!(
            "Cache miss for {} documents, calling {} provider",
            normalized.len(),
            self.model()
        );
        let embeddings = self.provider.generate(&normalized).await?;
        Self::save(&path, &embeddings).await?;

        Ok(embeddings)
    }

    /// Load a cached batch from disk.
    async fn load(path: &Path) -> Result<Vec<DocumentEmbedding>> {
        let content = fs::read_to_string(path).await?;
        let embeddings: Vec<DocumentEmbedding> = serde_json::from_str(&content)?;
        Ok(embeddings)
    }

    /// Write a batch to disk via a temporary file and a rename.
    async fn save(path: &Path, embeddings: &[DocumentEmbedding]) -> Result<()> {
        let content = serde_json::to_string(embeddings)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file_name = path.file_name().ok_or_else(|| {
            EmbeddingError::Cache(format!("invalid cache path: {}", path.display()))
        })?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, path).await?;

        info!("Cached {} embeddings to {}", embeddings.len(), path.display());
        Ok(())
    }
}
