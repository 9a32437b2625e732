//! Data types for documents, sections, chunks, and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source markdown document read at ingest time.
///
/// Immutable once read; discarded after chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier of the source, typically the file path.
    pub source_file: String,
    /// The raw markdown text of the document.
    pub text: String,
}

impl Document {
    /// Create a document from a source identifier and its raw text.
    pub fn new(source_file: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_file: source_file.into(), text: text.into() }
    }
}

/// A flat markdown section: a title paired with the body it heads.
///
/// Sections are emitted in document order. The body of a titled section
/// begins with the heading line itself; content before the first heading is
/// titled "Introduction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The heading text, markers stripped.
    pub title: String,
    /// The section body, including the heading line.
    pub body: String,
}

/// The atomic retrievable unit: a bounded, trimmed slice of a section body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic content-addressed identifier (see [`chunk_id`](crate::chunking::chunk_id)).
    pub id: String,
    /// The trimmed chunk text. Never empty; empty chunks are dropped.
    pub text: String,
    /// The owning document's source identifier.
    pub source_file: String,
    /// The owning section's title.
    pub source_section: String,
    /// Zero-based position within the chunking pass over the section.
    pub chunk_index: usize,
    /// Vector embedding, attached by the pipeline after chunking.
    pub embedding: Vec<f32>,
    /// Timestamp of chunk construction.
    pub created_at: DateTime<Utc>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// Retrieved chunks carry no embedding; only the payload round-trips through
/// the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
