//! Retrieval facade wiring configuration to providers, cache and index.

use std::sync::Arc;

use tracing::{debug, info};

use embedrank_embeddings::{
    CachingEmbeddingGenerator, DocumentIndex, EmbeddingModel, EmbeddingProvider, OpenAIProvider,
    ScoredDocument,
};

use crate::config::{EmbeddingConfig, LocalConfig, RetrievalConfig};
use crate::error::Result;

/// Build the provider selected by `config`.
pub fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.model {
        EmbeddingModel::OpenAI => {
            let mut provider = OpenAIProvider::new()
                .with_model(&config.openai.model)
                .with_base_url(&config.openai.base_url);
            if let Some(key) = &config.openai.api_key {
                provider = provider.with_api_key(key);
            }
            Ok(Arc::new(provider))
        }
        EmbeddingModel::SentenceTransformer => build_local_provider(&config.local),
    }
}

#[cfg(feature = "local")]
fn build_local_provider(config: &LocalConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider = embedrank_embeddings::LocalProvider::with_model(&config.model)?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "local"))]
fn build_local_provider(config: &LocalConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    // Reject unknown names first so the error points at the model.
    embedrank_embeddings::local_model_dimension(&config.model)?;
    Err(embedrank_embeddings::EmbeddingError::ProviderNotConfigured(
        "local models require building with the `local` feature".to_string(),
    )
    .into())
}

/// Embeds document batches through the on-disk cache and ranks queries.
///
/// Each call to [`Retriever::index`] produces an independent
/// [`DocumentIndex`]; the retriever itself only owns the generator.
pub struct Retriever {
    /// Configuration.
    config: RetrievalConfig,

    /// Shared caching generator.
    generator: Arc<CachingEmbeddingGenerator>,
}

impl Retriever {
    /// Create a new retriever builder.
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::new()
    }

    /// Create a retriever with the provider selected by `config`.
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        let provider = build_provider(&config.embedding)?;
        Self::with_provider(config, provider)
    }

    /// Create a retriever around an already constructed provider.
    pub fn with_provider(
        config: RetrievalConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            "Using {} embeddings ({}), cache in {}",
            provider.kind(),
            provider.model(),
            config.cache_dir.display()
        );

        let generator = Arc::new(CachingEmbeddingGenerator::new(
            provider,
            config.cache_dir.clone(),
        ));
        Ok(Self { config, generator })
    }

    /// Configuration in use.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The caching generator shared by every index.
    pub fn generator(&self) -> &Arc<CachingEmbeddingGenerator> {
        &self.generator
    }

    /// Embed `documents` and build an index over them.
    pub async fn index(&self, documents: Vec<String>) -> Result<DocumentIndex> {
        debug!("Indexing {} documents", documents.len());
        let index = DocumentIndex::from_documents(Arc::clone(&self.generator), documents).await?;
        Ok(index)
    }

    /// Rank `documents` against `query`, returning the configured top-k.
    pub async fn rank(&self, documents: Vec<String>, query: &str) -> Result<Vec<ScoredDocument>> {
        let index = self.index(documents).await?;
        let results = index.query(query, self.config.top_k).await?;
        Ok(results)
    }
}

/// Builder for [`Retriever`].
pub struct RetrieverBuilder {
    config: RetrievalConfig,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl RetrieverBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            provider: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    /// Set the embedding model family.
    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.config.embedding.model = model;
        self
    }

    /// Set the number of results per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Use this provider instead of building one from the configuration.
    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the retriever.
    pub fn build(self) -> Result<Retriever> {
        match self.provider {
            Some(provider) => Retriever::with_provider(self.config, provider),
            None => Retriever::new(self.config),
        }
    }
}

impl Default for RetrieverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
