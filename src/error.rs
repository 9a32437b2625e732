//! Error types for the `textbook-rag` crate.
//!
//! Per-file failures during a batch ingest (unreadable file, embedding or
//! upsert failure) are deliberately *not* represented here: they are recovered
//! into the [`IngestReport`](crate::ingest::IngestReport) error list so a run
//! always completes and reports partial success.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during answer synthesis.
    #[error("Synthesis error ({provider}): {message}")]
    Synthesis {
        /// The synthesizer backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The ingest source path is missing or not a directory.
    #[error("Source not found or not a directory: {0}")]
    SourceNotFound(PathBuf),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
