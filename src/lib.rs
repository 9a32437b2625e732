//! Retrieval-augmented question answering over the Physical AI textbook.
//!
//! This crate ingests markdown documents, splits them into flat sections,
//! chunks each section into bounded overlapping windows, embeds and stores
//! the chunks in a vector collection, and answers questions by retrieving
//! the nearest chunks and asking a language model to synthesize a grounded
//! answer.
//!
//! The moving parts:
//!
//! - [`splitter`] — flat markdown section splitting
//! - [`chunking`] — fixed-window chunking and content-addressed chunk ids
//! - [`embedding`] / [`openai`] — embedding providers (real and deterministic stub)
//! - [`vectorstore`] / [`inmemory`] / [`qdrant`] — vector storage backends
//! - [`synthesizer`] — answer synthesis over retrieved context
//! - [`pipeline`] — the orchestrator tying the above together
//! - [`server`] — the axum REST surface (ingest, chat, health)

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod server;
pub mod splitter;
pub mod synthesizer;
pub mod vectorstore;

pub use chunking::{Chunker, FixedWindowChunker, chunk_id};
pub use config::{EmbeddingBackend, RagConfig, ServiceConfig, VectorBackend};
pub use document::{Chunk, Document, SearchResult, Section};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{RagError, Result};
pub use ingest::{IngestReport, discover_markdown_files};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{NO_RELEVANT_CONTENT, RagAnswer, RagPipeline};
pub use splitter::split_sections;
pub use synthesizer::AnswerSynthesizer;
pub use vectorstore::VectorStore;
