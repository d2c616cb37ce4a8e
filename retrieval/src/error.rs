//! Error types for the retrieval facade.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval facade.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error(transparent)]
    Embedding(#[from] embedrank_embeddings::EmbeddingError),

    /// Configuration file could not be parsed.
    #[error("invalid configuration in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
