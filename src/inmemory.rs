//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock`. It backs the test suite and serves as the
//! configured store for local development without a Qdrant instance; its
//! contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory vector store using cosine similarity for search.
///
/// Collections are nested maps: collection name → chunk id → chunk. Upsert
/// overwrites by id, matching the idempotent re-ingest contract.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, Chunk>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> RagError {
        RagError::VectorStore {
            backend: "memory".to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<SearchResult> = store
            .values()
            .map(|stored| {
                let score = cosine_similarity(&stored.embedding, embedding);
                // Only the payload round-trips; embeddings stay in the store.
                let mut chunk = stored.clone();
                chunk.embedding = Vec::new();
                SearchResult { chunk, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text for {id}"),
            source_file: "doc.md".to_string(),
            source_section: "Introduction".to_string(),
            chunk_index: 0,
            embedding,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_id() {
        let store = InMemoryVectorStore::new();
        store.create_collection("c", 2).await.unwrap();
        store.upsert("c", &[chunk("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert("c", &[chunk("a", vec![1.0, 0.0])]).await.unwrap();

        let results = store.search("c", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_similarity() {
        let store = InMemoryVectorStore::new();
        store.create_collection("c", 2).await.unwrap();
        store
            .upsert(
                "c",
                &[
                    chunk("near", vec![1.0, 0.1]),
                    chunk("far", vec![-1.0, 0.0]),
                    chunk("mid", vec![0.5, 0.5]),
                ],
            )
            .await
            .unwrap();

        let results = store.search("c", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "near");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn search_on_missing_collection_is_an_error() {
        let store = InMemoryVectorStore::new();
        let err = store.search("nope", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn search_on_empty_collection_returns_no_results() {
        let store = InMemoryVectorStore::new();
        store.create_collection("c", 2).await.unwrap();
        let results = store.search("c", &[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }
}
