//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::Embedding;
use crate::error::Result;
use crate::provider::{EmbeddingModel, EmbeddingProvider};

/// Provider that answers from a lookup table and counts its calls.
///
/// Unknown texts get `[len, vowels, 1.0]`, which is never a zero vector.
pub(crate) struct StubProvider {
    model: String,
    table: HashMap<String, Embedding>,
    calls: AtomicUsize,
    seen: std::sync::Mutex<Vec<String>>,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self {
            model: "stub-model".to_string(),
            table: HashMap::new(),
            calls: AtomicUsize::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub(crate) fn with_vector(mut self, text: &str, embedding: Embedding) -> Self {
        self.table.insert(text.to_string(), embedding);
        self
    }

    /// Number of `embed_batch` calls so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every text the provider has been asked to embed.
    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    fn vector_for(&self, text: &str) -> Embedding {
        if let Some(embedding) = self.table.get(text) {
            return embedding.clone();
        }
        let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
        vec![text.len() as f32, vowels as f32, 1.0]
    }
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    fn kind(&self) -> EmbeddingModel {
        EmbeddingModel::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn default_dimension(&self) -> usize {
        3
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.extend(texts.iter().cloned());
        }
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}
