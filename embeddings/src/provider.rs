//! Embedding providers.
//!
//! Two backends share the [`EmbeddingProvider`] contract: the OpenAI
//! embeddings API and local sentence-transformer models run through
//! fastembed (behind the `local` feature).

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EmbeddingError, Result};
use crate::{DocumentEmbedding, Embedding};

/// Which family of embedding backend to use.
///
/// The tag (see [`EmbeddingModel::as_str`]) is what ends up in cache file
/// names and configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EmbeddingModel {
    /// OpenAI embeddings API.
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    /// Local sentence-transformer model.
    #[serde(rename = "sentence-transformer")]
    SentenceTransformer,
}

impl EmbeddingModel {
    /// Stable tag for this model family.
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingModel::OpenAI => "openai",
            EmbeddingModel::SentenceTransformer => "sentence-transformer",
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbeddingModel {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "openai" => Ok(EmbeddingModel::OpenAI),
            "sentence-transformer" => Ok(EmbeddingModel::SentenceTransformer),
            other => Err(EmbeddingError::UnsupportedModel(other.to_string())),
        }
    }
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The model family this provider implements.
    fn kind(&self) -> EmbeddingModel;

    /// Concrete model identifier (e.g. `text-embedding-3-large`).
    fn model(&self) -> &str;

    /// Get the default embedding dimension.
    fn default_dimension(&self) -> usize;

    /// Embed every text, returning one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed `documents` and pair each vector with its source text.
    async fn generate(&self, documents: &[String]) -> Result<Vec<DocumentEmbedding>> {
        let vectors = self.embed_batch(documents).await?;
        if vectors.len() != documents.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            )));
        }

        Ok(documents
            .iter()
            .zip(vectors)
            .map(|(document, embedding)| DocumentEmbedding::new(document.clone(), embedding))
            .collect())
    }

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI embedding provider.
pub struct OpenAIProvider {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model sent with every request.
    model: String,
}

impl OpenAIProvider {
    /// Default remote model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-3-large";

    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a new OpenAI provider with no API key.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn kind(&self) -> EmbeddingModel {
        EmbeddingModel::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn default_dimension(&self) -> usize {
        match self.model.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 1536,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            EmbeddingError::ProviderNotConfigured("OPENAI_API_KEY is not set".to_string())
        })?;

        debug!(
            "Generating batch embeddings for {} texts with model: {}",
            texts.len(),
            self.model
        );

        let body = serde_json::json!({
            "input": texts,
            "model": self.model
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!("{status}: {error_text}")));
        }

        let mut result: OpenAIEmbeddingResponse = response.json().await?;
        result.data.sort_by_key(|item| item.index);

        let embeddings: Vec<Embedding> = result
            .data
            .into_iter()
            .map(|item| item.embedding)
            .collect();

        info!(
            "Generated {} embeddings with model {}",
            embeddings.len(),
            result.model
        );

        Ok(embeddings)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Default local model.
pub const DEFAULT_LOCAL_MODEL: &str = "paraphrase-multilingual-MiniLM-L12-v2";

/// Local models the sentence-transformer provider knows how to load,
/// with their output dimension.
pub const LOCAL_MODELS: &[(&str, usize)] = &[
    (DEFAULT_LOCAL_MODEL, 384),
    ("paraphrase-multilingual-mpnet-base-v2", 768),
    ("all-MiniLM-L6-v2", 384),
    ("all-MiniLM-L12-v2", 384),
    ("bge-small-en-v1.5", 384),
];

/// Output dimension of a known local model.
pub fn local_model_dimension(name: &str) -> Result<usize> {
    LOCAL_MODELS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, dimension)| *dimension)
        .ok_or_else(|| EmbeddingError::UnsupportedModel(name.to_string()))
}

#[cfg(feature = "local")]
pub use local::LocalProvider;

#[cfg(feature = "local")]
mod local {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use fastembed::{EmbeddingModel as FastEmbedModel, InitOptions, TextEmbedding};
    use tokio::sync::OnceCell;
    use tokio::task;
    use tracing::{debug, info};

    use super::{DEFAULT_LOCAL_MODEL, EmbeddingModel, EmbeddingProvider, local_model_dimension};
    use crate::Embedding;
    use crate::error::{EmbeddingError, Result};

    /// Sentence-transformer provider running ONNX models on this machine.
    ///
    /// The model is loaded on first use and kept for the provider's lifetime.
    pub struct LocalProvider {
        model_name: String,
        dimension: usize,
        model: OnceCell<Arc<Mutex<TextEmbedding>>>,
    }

    impl LocalProvider {
        /// Create a provider for the default model.
        pub fn new() -> Self {
            Self {
                model_name: DEFAULT_LOCAL_MODEL.to_string(),
                dimension: 384,
                model: OnceCell::new(),
            }
        }

        /// Create a provider for a named model. Fails for unknown names.
        pub fn with_model(model: impl Into<String>) -> Result<Self> {
            let model_name = model.into();
            let dimension = local_model_dimension(&model_name)?;
            Ok(Self {
                model_name,
                dimension,
                model: OnceCell::new(),
            })
        }

        fn fastembed_model(name: &str) -> Result<FastEmbedModel> {
            match name {
                "paraphrase-multilingual-MiniLM-L12-v2" => {
                    Ok(FastEmbedModel::ParaphraseMLMiniLML12V2)
                }
                "paraphrase-multilingual-mpnet-base-v2" => {
                    Ok(FastEmbedModel::ParaphraseMLMpnetBaseV2)
                }
                "all-MiniLM-L6-v2" => Ok(FastEmbedModel::AllMiniLML6V2),
                "all-MiniLM-L12-v2" => Ok(FastEmbedModel::AllMiniLML12V2),
                "bge-small-en-v1.5" => Ok(FastEmbedModel::BGESmallENV15),
                other => Err(EmbeddingError::UnsupportedModel(other.to_string())),
            }
        }

        async fn loaded(&self) -> Result<Arc<Mutex<TextEmbedding>>> {
            let model = self
                .model
                .get_or_try_init(|| async {
                    let fastembed_model = Self::fastembed_model(&self.model_name)?;
                    info!("Loading local embedding model {}", self.model_name);

                    let options =
                        InitOptions::new(fastembed_model).with_show_download_progress(false);
                    let embedding = task::spawn_blocking(move || TextEmbedding::try_new(options))
                        .await
                        .map_err(|e| {
                            EmbeddingError::ProviderNotConfigured(format!(
                                "model loader panicked: {e}"
                            ))
                        })?
                        .map_err(|e| {
                            EmbeddingError::ProviderNotConfigured(format!(
                                "failed to load model: {e}"
                            ))
                        })?;

                    Ok::<_, EmbeddingError>(Arc::new(Mutex::new(embedding)))
                })
                .await?;
            Ok(Arc::clone(model))
        }
    }

    impl Default for LocalProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for LocalProvider {
        fn kind(&self) -> EmbeddingModel {
            EmbeddingModel::SentenceTransformer
        }

        fn model(&self) -> &str {
            &self.model_name
        }

        fn default_dimension(&self) -> usize {
            self.dimension
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let model = self.loaded().await?;
            let texts = texts.to_vec();
            debug!("Encoding {} texts locally", texts.len());

            task::spawn_blocking(move || {
                let mut model = model.lock().map_err(|e| {
                    EmbeddingError::InvalidResponse(format!("model lock poisoned: {e}"))
                })?;

                // One document per call, matching sentence-transformers `encode`
                let mut embeddings = Vec::with_capacity(texts.len());
                for text in &texts {
                    let mut encoded = model
                        .embed(vec![text.as_str()], None)
                        .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
                    let embedding = encoded.pop().ok_or_else(|| {
                        EmbeddingError::InvalidResponse("no embedding returned".to_string())
                    })?;
                    embeddings.push(embedding);
                }
                Ok::<_, EmbeddingError>(embeddings)
            })
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("encoder panicked: {e}")))?
        }

        fn is_available(&self) -> bool {
            true
        }
    }

}
