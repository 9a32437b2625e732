//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// Upsert is keyed by chunk id: re-ingesting an unchanged document rewrites
/// the same records instead of duplicating them. Once upserted, the store is
/// the canonical owner of a chunk's persisted form.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection for vectors of the given dimensionality.
    /// No-op if the collection already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data. Used for re-indexing.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert chunks into a collection. Chunks must have embeddings attached.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `limit` chunks most similar to the given embedding,
    /// ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
}
