//! Embedding provider trait and the deterministic stub implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially and preserves input
/// order; backends with native batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, one vector per
    /// input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// A deterministic digest-based embedding stub for development and tests.
///
/// The vector is derived from the SHA-256 digest of the text: each digest
/// byte maps to a value in `[-1, 1)` and the remainder is zero-padded up to
/// the configured dimensionality. Identical text always embeds identically;
/// the geometry carries no semantic meaning. Selected explicitly through
/// configuration, never by availability detection.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Create a stub producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbeddingProvider {
    /// 384 dimensions, matching the small sentence-transformer models the
    /// stub typically stands in for.
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let digest = Sha256::digest(text.as_bytes());
        let mut embedding: Vec<f32> = digest
            .iter()
            .take(self.dimensions)
            .map(|&b| f32::from(b) / 128.0 - 1.0)
            .collect();
        embedding.resize(self.dimensions, 0.0);
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
