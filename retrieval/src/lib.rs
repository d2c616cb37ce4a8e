//! # Retrieval
//!
//! Configured entry point over `embedrank-embeddings`: turns a
//! [`RetrievalConfig`] into a provider, a caching generator and document
//! indexes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use embedrank_retrieval::{RetrievalConfig, Retriever};
//!
//! let config = RetrievalConfig::load("embedrank.toml").await?.with_env()?;
//! let retriever = Retriever::new(config)?;
//!
//! let results = retriever.rank(documents, "É um animal que faz au au").await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EmbeddingConfig, LocalConfig, OpenAIConfig, RetrievalConfig};
pub use engine::{Retriever, RetrieverBuilder, build_provider};
pub use error::{Result, RetrievalError};

// Re-export from dependencies for convenience
pub use embedrank_embeddings::{DocumentIndex, EmbeddingModel, EmbeddingProvider, ScoredDocument};
