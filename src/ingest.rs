//! Markdown source discovery and batch ingest reporting.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{RagError, Result};

/// Outcome of a batch ingest run.
///
/// A run always completes: per-file failures (unreadable file, embedding
/// failure) and a failed upsert are recorded as messages in `errors` while
/// the remaining files are still processed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of markdown files found under the source directory.
    pub discovered_files: usize,
    /// Number of files successfully chunked and embedded.
    pub processed_files: usize,
    /// Total number of chunks created across processed files.
    pub total_chunks: usize,
    /// Per-file and upsert error messages, in encounter order.
    pub errors: Vec<String>,
}

impl IngestReport {
    /// Record a recovered error.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Recursively enumerate markdown files under `source`, sorted by path.
///
/// # Errors
///
/// Returns [`RagError::SourceNotFound`] if `source` does not exist or is not
/// a directory.
pub fn discover_markdown_files(source: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let source = source.as_ref();
    if !source.is_dir() {
        return Err(RagError::SourceNotFound(source.to_path_buf()));
    }

    let mut files = WalkDir::new(source)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    files.sort();
    Ok(files)
}
