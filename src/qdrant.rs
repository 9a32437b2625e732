//! Qdrant vector store backend.
//!
//! Implements [`VectorStore`] over gRPC using the
//! [qdrant-client](https://docs.rs/qdrant-client) crate. Only available with
//! the `qdrant` feature. Chunk text and provenance are stored as point
//! payload in the same shape the chat endpoint returns:
//! `{chunk_id, text, source_file, source_section,
//! metadata: {chunk_index, created_at}}`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created with cosine distance. Point ids are UUIDs derived
/// deterministically from the content-addressed chunk ids, which makes upsert
/// overwrite prior versions of the same logical chunk.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Connect to Qdrant at the given gRPC URL, with an optional API key.
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Qdrant::from_url(url).api_key(api_key).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStore { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn extract_index(value: &QdrantValue) -> Option<usize> {
        match &value.kind {
            Some(Kind::IntegerValue(n)) => usize::try_from(*n).ok(),
            Some(Kind::StringValue(s)) => s.parse().ok(),
            _ => None,
        }
    }

    fn payload_for(chunk: &Chunk) -> Payload {
        let payload = json!({
            "chunk_id": chunk.id,
            "text": chunk.text,
            "source_file": chunk.source_file,
            "source_section": chunk.source_section,
            "metadata": {
                "chunk_index": chunk.chunk_index,
                "created_at": chunk.created_at.to_rfc3339(),
            },
        });
        Payload::try_from(payload).unwrap_or_default()
    }
}

/// Derive the UUID point id for a chunk id.
///
/// Qdrant only accepts UUID-shaped strings (or integers) as point ids, so the
/// readable content-addressed chunk id cannot be used directly. Hashing it
/// into a UUID keeps the id deterministic: re-upserting an unchanged chunk
/// still overwrites the same point. The chunk id itself travels in the
/// payload.
fn point_uuid(chunk_id: &str) -> String {
    let digest = Sha256::digest(chunk_id.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    uuid::Uuid::from_bytes(bytes).to_string()
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == name) {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .iter()
            .map(|chunk| {
                PointStruct::new(
                    point_uuid(&chunk.id),
                    chunk.embedding.clone(),
                    Self::payload_for(chunk),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let field =
                    |name: &str| scored.payload.get(name).and_then(Self::extract_string);
                // The readable chunk id lives in the payload; the point id is
                // its UUID projection, kept only as a fallback.
                let id = field("chunk_id")
                    .or_else(|| {
                        scored.id.as_ref().and_then(|pid| match &pid.point_id_options {
                            Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                            None => None,
                        })
                    })
                    .unwrap_or_default();

                let text = field("text").unwrap_or_default();
                let source_file = field("source_file").unwrap_or_default();
                let source_section = field("source_section").unwrap_or_default();

                let metadata = scored.payload.get("metadata").and_then(|v| match &v.kind {
                    Some(Kind::StructValue(s)) => Some(&s.fields),
                    _ => None,
                });
                let chunk_index = metadata
                    .and_then(|fields| fields.get("chunk_index"))
                    .and_then(Self::extract_index)
                    .unwrap_or_default();
                let created_at = metadata
                    .and_then(|fields| fields.get("created_at"))
                    .and_then(Self::extract_string)
                    .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now);

                SearchResult {
                    chunk: Chunk {
                        id,
                        text,
                        source_file,
                        source_section,
                        chunk_index,
                        embedding: Vec::new(),
                        created_at,
                    },
                    score: scored.score,
                }
            })
            .collect();

        Ok(results)
    }
}
