//! Document index ranked by cosine similarity.

use std::sync::Arc;

use tracing::debug;

use crate::DocumentEmbedding;
use crate::cache::CachingEmbeddingGenerator;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{ScoredDocument, find_top_k};

/// Number of results returned when the caller does not ask for more.
pub const DEFAULT_TOP_K: usize = 3;

/// A fixed set of documents with their embeddings.
///
/// Search is a brute-force scan over every stored embedding.
pub struct DocumentIndex {
    /// Generator used to embed incoming queries.
    generator: Arc<CachingEmbeddingGenerator>,

    /// Embeddings, parallel to `documents`.
    embeddings: Vec<DocumentEmbedding>,

    /// Source texts returned with results.
    documents: Vec<String>,
}

impl DocumentIndex {
    /// Build an index from parallel embeddings and documents.
    ///
    /// Both lists must have the same length and every embedding the same
    /// dimension.
    pub fn new(
        generator: Arc<CachingEmbeddingGenerator>,
        embeddings: Vec<DocumentEmbedding>,
        documents: Vec<String>,
    ) -> Result<Self> {
        if embeddings.len() != documents.len() {
            return Err(EmbeddingError::LengthMismatch {
                embeddings: embeddings.len(),
                documents: documents.len(),
            });
        }

        if let Some(first) = embeddings.first() {
            let expected = first.embedding.len();
            if let Some(bad) = embeddings.iter().find(|e| e.embedding.len() != expected) {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: bad.embedding.len(),
                });
            }
        }

        Ok(Self {
            generator,
            embeddings,
            documents,
        })
    }

    /// Embed `documents` through the generator and index the result.
    pub async fn from_documents(
        generator: Arc<CachingEmbeddingGenerator>,
        documents: Vec<String>,
    ) -> Result<Self> {
        let embeddings = generator.generate(&documents).await?;
        Self::new(generator, embeddings, documents)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Indexed documents, in insertion order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Embedding dimension, if the index is not empty.
    pub fn dimension(&self) -> Option<usize> {
        self.embeddings.first().map(|e| e.embedding.len())
    }

    /// Rank every document against an already computed query embedding.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredDocument>> {
        let candidates: Vec<(&str, &[f32])> = self
            .documents
            .iter()
            .zip(&self.embeddings)
            .map(|(document, embedding)| (document.as_str(), embedding.embedding.as_slice()))
            .collect();

        find_top_k(query, &candidates, top_k)
    }

    /// Embed `text` and return the `top_k` closest documents, best first.
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredDocument>> {
        debug!("Querying {} documents (top {top_k})", self.len());

        let query = self
            .generator
            .generate(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("no embedding for query".to_string())
            })?;

        self.search(&query.embedding, top_k)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::testing::StubProvider;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn generator(provider: Arc<StubProvider>, dir: &Path) -> Arc<CachingEmbeddingGenerator> {
        Arc::new(CachingEmbeddingGenerator::new(provider, dir))
    }

    fn entry(id: &str, embedding: Vec<f32>) -> DocumentEmbedding {
        DocumentEmbedding::new(id, embedding)
    }

    /// The returned directory holds the cache and must outlive the index.
    fn sample_index() -> (TempDir, DocumentIndex) {
        let dir = tempfile::tempdir().unwrap();
        let index = DocumentIndex::new(
            generator(Arc::new(StubProvider::new()), dir.path()),
            vec![
                entry("rock", vec![0.8, 0.2, 0.1]),
                entry("classical", vec![0.1, 0.9, 0.2]),
                entry("pop", vec![0.5, 0.3, 0.7]),
                entry("mixed", vec![0.4, 0.4, 0.4]),
            ],
            vec![
                "rock".to_string(),
                "classical".to_string(),
                "pop".to_string(),
                "mixed".to_string(),
            ],
        )
        .unwrap();
        (dir, index)
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentIndex::new(
            generator(Arc::new(StubProvider::new()), dir.path()),
            vec![entry("a", vec![1.0, 0.0])],
            vec!["a".to_string(), "b".to_string()],
        );
        assert!(matches!(
            result,
            Err(EmbeddingError::LengthMismatch {
                embeddings: 1,
                documents: 2
            })
        ));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentIndex::new(
            generator(Arc::new(StubProvider::new()), dir.path()),
            vec![entry("a", vec![1.0, 0.0]), entry("b", vec![1.0, 0.0, 0.0])],
            vec!["a".to_string(), "b".to_string()],
        );
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_search_returns_min_of_k_and_len() {
        let (_dir, index) = sample_index();
        for k in 0..=6 {
            let results = index.search(&[1.0, 0.0, 0.0], k).unwrap();
            assert_eq!(results.len(), k.min(index.len()));
        }
    }

    #[test]
    fn test_search_scores_are_non_increasing() {
        let (_dir, index) = sample_index();
        let results = index.search(&[0.2, 0.5, 0.9], 4).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score, "{results:?}");
        }
    }

    #[test]
    fn test_search_best_match_first() {
        let (_dir, index) = sample_index();
        let results = index.search(&[0.8, 0.2, 0.1], DEFAULT_TOP_K).unwrap();
        assert_eq!(results[0].document, "rock");
        assert_eq!(results[0].index, 0);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_query_vector_is_an_error() {
        let (_dir, index) = sample_index();
        let result = index.search(&[0.0, 0.0, 0.0], 2);
        assert!(matches!(result, Err(EmbeddingError::ZeroVector)));
    }

    #[tokio::test]
    async fn test_query_embeds_text_and_ranks() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(
            StubProvider::new()
                .with_vector("O gato mia", vec![1.0, 0.1, 0.0])
                .with_vector("O cão late", vec![0.1, 1.0, 0.0])
                .with_vector("faz au au", vec![0.0, 0.9, 0.1]),
        );
        let documents = vec!["O gato mia".to_string(), "O cão late".to_string()];
        let index = DocumentIndex::from_documents(generator(provider.clone(), dir.path()), documents)
            .await
            .unwrap();

        let results = index.query("faz au au", DEFAULT_TOP_K).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document, "O cão late");
        assert_eq!(results[1].document, "O gato mia");

        // One call for the documents, one for the query; repeats hit the cache
        index.query("faz au au", DEFAULT_TOP_K).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_results_carry_original_documents() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(StubProvider::new());
        let documents = vec!["first line\nsecond line".to_string()];
        let index = DocumentIndex::from_documents(generator(provider, dir.path()), documents)
            .await
            .unwrap();

        let results = index.query("second", 1).await.unwrap();
        assert_eq!(results[0].document, "first line\nsecond line");
    }

    #[tokio::test]
    async fn test_query_cache_is_removed_with_its_directory() {
        let (dir, index) = sample_index();
        let cache_dir = dir.path().to_path_buf();

        index.query("rock", 1).await.unwrap();
        assert_eq!(std::fs::read_dir(&cache_dir).unwrap().count(), 1);

        drop(index);
        drop(dir);
        assert!(!cache_dir.exists());
    }
}
