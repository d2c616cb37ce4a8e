//! Similarity computation for embeddings.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// Compute the dot product between two embeddings.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Euclidean (L2) norm of a vector.
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// The similarity is undefined when either vector has zero norm; that case
/// is reported as [`EmbeddingError::ZeroVector`] rather than a number.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    let dot = dot_product(a, b)?;
    let magnitude_a = norm(a);
    let magnitude_b = norm(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Err(EmbeddingError::ZeroVector);
    }

    Ok(dot / (magnitude_a * magnitude_b))
}

/// A document ranked against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Position of the document in the index.
    pub index: usize,

    /// The document text.
    pub document: String,

    /// Cosine similarity to the query.
    pub score: f32,
}

impl ScoredDocument {
    /// Create a new scored document.
    pub fn new(index: usize, document: impl Into<String>, score: f32) -> Self {
        Self {
            index,
            document: document.into(),
            score,
        }
    }
}

/// Find the top-k most similar embeddings.
///
/// `candidates` pairs each document with its embedding. Equal scores keep
/// their candidate order.
pub fn find_top_k(
    query: &[f32],
    candidates: &[(&str, &[f32])],
    k: usize,
) -> Result<Vec<ScoredDocument>> {
    let mut scores: Vec<(OrderedFloat<f32>, usize)> = Vec::with_capacity(candidates.len());

    for (position, (_, embedding)) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, embedding)?;
        scores.push((OrderedFloat(score), position));
    }

    // Stable, so ties stay in insertion order
    scores.sort_by_key(|(score, _)| Reverse(*score));

    Ok(scores
        .into_iter()
        .take(k)
        .map(|(score, position)| ScoredDocument::new(position, candidates[position].0, score.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_dot_product() {
        let dot = dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert!((dot - 32.0).abs() < EPSILON);
    }

    #[test]
    fn test_norm() {
        assert!((norm(&[3.0, 4.0]) - 5.0).abs() < EPSILON);
        assert_eq!(norm(&[]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        for v in [vec![1.0, 0.0, 0.0], vec![0.3, -1.2, 4.5], vec![0.8, 0.2, 0.1]] {
            let sim = cosine_similarity(&v, &v).unwrap();
            assert!((sim - 1.0).abs() < EPSILON, "{v:?} -> {sim}");
        }
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let pairs: Vec<(Vec<f32>, Vec<f32>)> = vec![
            (vec![0.1, 0.9, 0.2], vec![0.5, 0.3, 0.7]),
            (vec![-0.4, -1.5, -2.0], vec![-3.1, -0.2, -0.9]),
            (vec![1.0, -2.0, 3.0], vec![-0.5, 0.25, 4.0]),
            (vec![0.3, -0.7, 1e-3], vec![-1e3, 2.5, 0.0]),
            (
                vec![0.12, -0.5, 0.33, 0.9, -0.01, 0.4, -0.77, 0.05],
                vec![-0.6, 0.2, 0.8, -0.1, 0.45, -0.3, 0.0, 0.99],
            ),
        ];

        for (a, b) in &pairs {
            let ab = cosine_similarity(a, b).unwrap();
            let ba = cosine_similarity(b, a).unwrap();
            assert_eq!(ab, ba, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < EPSILON);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_vector_is_an_error() {
        let result = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert!(matches!(result, Err(EmbeddingError::ZeroVector)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_find_top_k() {
        let a: &[f32] = &[1.0, 0.0, 0.0];
        let b: &[f32] = &[0.0, 1.0, 0.0];
        let c: &[f32] = &[0.7, 0.7, 0.0];
        let candidates = vec![("a", a), ("b", b), ("c", c)];

        let results = find_top_k(&[1.0, 0.0, 0.0], &candidates, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document, "a");
        assert_eq!(results[1].document, "c");
        assert_eq!(results[1].index, 2);
    }

    #[test]
    fn test_find_top_k_ties_keep_insertion_order() {
        let v: &[f32] = &[1.0, 1.0];
        let candidates = vec![("first", v), ("second", v), ("third", v)];

        let results = find_top_k(&[2.0, 2.0], &candidates, 3).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.document.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
