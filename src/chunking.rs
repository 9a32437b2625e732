//! Fixed-window document chunking with boundary-aware trimming.
//!
//! [`FixedWindowChunker`] slices a section body into overlapping chunks of at
//! most `chunk_size` characters, preferring to cut just after a sentence or
//! paragraph break found inside the overlap window. Chunk identity is
//! content-addressed via [`chunk_id`], which makes re-ingestion an idempotent
//! upsert as long as the vector store overwrites by id.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::document::{Chunk, Document};
use crate::splitter::split_sections;

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks. Returns an empty `Vec` for empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Derive a deterministic, content-addressed chunk identifier.
///
/// The id is `chunk_{prefix}_{index}` where `prefix` is the first 12 hex
/// characters of the SHA-256 digest over the chunk text, the source file, and
/// the decimal chunk index. Identical inputs always yield the identical id,
/// so re-ingesting an unchanged document overwrites rather than duplicates.
pub fn chunk_id(text: &str, source_file: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(source_file.as_bytes());
    hasher.update(chunk_index.to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("chunk_{}_{chunk_index}", &digest[..12])
}

/// Splits section text into overlapping, bounded-length chunks.
///
/// Operates on character indices. Within the window
/// `[end - chunk_overlap, end]` the cut is moved to fall immediately after
/// the rightmost sentence or whitespace boundary; if none exists, a hard cut
/// mid-word is accepted. Callers are expected to validate
/// `chunk_overlap < chunk_size` via
/// [`RagConfig`](crate::config::RagConfig) before constructing one.
#[derive(Debug, Clone)]
pub struct FixedWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Break tokens searched for inside the overlap window, in priority order
/// for ties at the same index.
const BREAK_TOKENS: [(&str, usize); 6] =
    [(".", 1), ("!", 1), ("?", 1), ("\n\n", 2), ("\n", 1), (" ", 1)];

impl FixedWindowChunker {
    /// Create a new `FixedWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Chunk one section's text, tagging each chunk with its source file and
    /// section title.
    ///
    /// `chunk_index` counts chunking passes over this text stream, so an
    /// all-whitespace window still advances the index even though no chunk is
    /// emitted for it.
    pub fn chunk_text(&self, text: &str, source_file: &str, source_section: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < chars.len() {
            let tentative = start + self.chunk_size;
            let end = if tentative < chars.len() {
                let window_start = tentative.saturating_sub(self.chunk_overlap);
                find_break(&chars, window_start, tentative).unwrap_or(tentative)
            } else {
                chars.len()
            };

            let raw: String = chars[start..end].iter().collect();
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                chunks.push(Chunk {
                    id: chunk_id(trimmed, source_file, chunk_index),
                    text: trimmed.to_string(),
                    source_file: source_file.to_string(),
                    source_section: source_section.to_string(),
                    chunk_index,
                    embedding: Vec::new(),
                    created_at: Utc::now(),
                });
            }

            // Step back by the overlap; force progress if the window degenerated.
            let next = end.saturating_sub(self.chunk_overlap);
            start = if next > start { next } else { end };
            chunk_index += 1;
        }

        chunks
    }
}

/// Find the rightmost break token inside `[window_start, window_end)` and
/// return the cut position just after it.
///
/// For the two-character paragraph break the whole token must fit before
/// `window_end`. The single `\n` token also matches the second character of a
/// paragraph break, so both cases cut after the full `\n\n` sequence.
fn find_break(chars: &[char], window_start: usize, window_end: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (token, len) in BREAK_TOKENS {
        let found = if token == "\n\n" {
            rfind_pair(chars, '\n', window_start, window_end)
        } else {
            let c = token.chars().next().unwrap();
            rfind_char(chars, c, window_start, window_end)
        };
        if let Some(index) = found {
            if best.is_none_or(|(best_index, _)| index > best_index) {
                best = Some((index, len));
            }
        }
    }
    best.map(|(index, len)| index + len)
}

/// Rightmost occurrence of `c` in `chars[lo..hi]`.
fn rfind_char(chars: &[char], c: char, lo: usize, hi: usize) -> Option<usize> {
    chars[lo..hi].iter().rposition(|&x| x == c).map(|pos| lo + pos)
}

/// Rightmost index where `c` occurs twice in a row, entirely within `chars[lo..hi]`.
fn rfind_pair(chars: &[char], c: char, lo: usize, hi: usize) -> Option<usize> {
    if hi < lo + 2 {
        return None;
    }
    (lo..=hi - 2).rev().find(|&j| chars[j] == c && chars[j + 1] == c)
}

impl Chunker for FixedWindowChunker {
    /// Split a markdown document into flat sections, then chunk each section
    /// body. Chunk indices restart at zero for every section.
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        for section in split_sections(&document.text) {
            chunks.extend(self.chunk_text(&section.body, &document.source_file, &section.title));
        }
        chunks
    }
}
