//! # Embeddings
//!
//! Text embedding generation, on-disk memoization and cosine ranking.
//!
//! ## Features
//!
//! - **Embedding Generation**: OpenAI API or a local sentence-transformer model
//! - **Caching**: whole-batch results memoized to JSON files
//! - **Ranking**: brute-force cosine similarity over a fixed document set
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► CachingEmbeddingGenerator ──► DocumentIndex │
//! │       │                         │                        │      │
//! │       ▼                         ▼                        ▼      │
//! │  OpenAI/Local        embeddings_<model>_<key>.json   similarity │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;
pub mod taste;

#[cfg(test)]
mod testing;

pub use cache::CachingEmbeddingGenerator;
pub use error::{EmbeddingError, Result};
pub use index::{DEFAULT_TOP_K, DocumentIndex};
#[cfg(feature = "local")]
pub use provider::LocalProvider;
pub use provider::{
    DEFAULT_LOCAL_MODEL, EmbeddingModel, EmbeddingProvider, LOCAL_MODELS, OpenAIProvider,
    local_model_dimension,
};
pub use similarity::{ScoredDocument, cosine_similarity, dot_product, norm};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// An embedding tied to the text it was computed from.
///
/// This is also the on-disk cache record: `{"id": ..., "embedding": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEmbedding {
    /// The source text.
    pub id: String,

    /// The embedding vector.
    pub embedding: Embedding,
}

impl DocumentEmbedding {
    /// Create a new document embedding.
    pub fn new(id: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }
}
