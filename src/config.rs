//! Configuration for the RAG pipeline and the service around it.
//!
//! [`RagConfig`] carries the chunking and retrieval parameters and is
//! validated at build time. [`ServiceConfig`] is loaded once at process start
//! from the environment and passed by injection into the components that need
//! it — there is no ambient global.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Chunking and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 5 }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// Which embedding backend to construct at startup.
///
/// The deterministic hash backend exists for development and tests; it is
/// selected explicitly here, never by availability detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI embeddings API.
    OpenAi,
    /// Deterministic digest-based stub.
    Hash,
}

/// Which vector store backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorBackend {
    /// Qdrant over gRPC.
    Qdrant,
    /// In-process store, lost on restart.
    InMemory,
}

/// Process-level configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Qdrant gRPC endpoint.
    pub qdrant_url: String,
    /// Optional Qdrant API key.
    pub qdrant_api_key: Option<String>,
    /// Name of the vector collection holding textbook chunks.
    pub collection_name: String,
    /// OpenAI API key, required for the OpenAI embedding backend and for
    /// answer synthesis.
    pub openai_api_key: Option<String>,
    /// Selected embedding backend.
    pub embedding_backend: EmbeddingBackend,
    /// Selected vector store backend.
    pub vector_backend: VectorBackend,
    /// Chunking and retrieval defaults.
    pub rag: RagConfig,
}

impl ServiceConfig {
    /// Load the configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; `EMBEDDING_BACKEND` accepts
    /// `openai` (default) or `hash`, `VECTOR_BACKEND` accepts `qdrant`
    /// (default) or `memory`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] on unparseable numeric values, unknown
    /// backend names, or inconsistent chunk parameters.
    pub fn from_env() -> Result<Self> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", 8000u16)?;
        let qdrant_url = env_or("QDRANT_URL", "http://localhost:6334");
        let qdrant_api_key = std::env::var("QDRANT_API_KEY").ok();
        let collection_name = env_or("COLLECTION_NAME", "textbook_content");
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        let embedding_backend = match env_or("EMBEDDING_BACKEND", "openai").as_str() {
            "openai" => EmbeddingBackend::OpenAi,
            "hash" => EmbeddingBackend::Hash,
            other => {
                return Err(RagError::Config(format!(
                    "unknown EMBEDDING_BACKEND '{other}' (expected 'openai' or 'hash')"
                )));
            }
        };

        let vector_backend = match env_or("VECTOR_BACKEND", "qdrant").as_str() {
            "qdrant" => VectorBackend::Qdrant,
            "memory" => VectorBackend::InMemory,
            other => {
                return Err(RagError::Config(format!(
                    "unknown VECTOR_BACKEND '{other}' (expected 'qdrant' or 'memory')"
                )));
            }
        };

        let rag = RagConfig::builder()
            .chunk_size(parse_env("CHUNK_SIZE", 1000usize)?)
            .chunk_overlap(parse_env("CHUNK_OVERLAP", 200usize)?)
            .top_k(parse_env("TOP_K", 5usize)?)
            .build()?;

        Ok(Self {
            host,
            port,
            qdrant_url,
            qdrant_api_key,
            collection_name,
            openai_api_key,
            embedding_backend,
            vector_backend,
            rag,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| RagError::Config(format!("invalid value for {key}: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
