//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Provider not configured (missing API key, feature disabled, ...).
    #[error("embedding provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Model name or tag that no provider knows about.
    #[error("model {0} not supported")]
    UnsupportedModel(String),

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Invalid response from provider.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embeddings and documents handed to an index differ in length.
    #[error("length mismatch: {embeddings} embeddings for {documents} documents")]
    LengthMismatch { embeddings: usize, documents: usize },

    /// Cosine similarity is undefined for a vector with zero norm.
    #[error("cosine similarity is undefined for a zero vector")]
    ZeroVector,

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
