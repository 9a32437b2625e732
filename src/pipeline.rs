//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] coordinates ingest (split → chunk → embed → upsert) and
//! retrieval (embed → search → synthesize) over constructor-injected
//! collaborators: an [`EmbeddingProvider`], a [`VectorStore`], and an
//! [`AnswerSynthesizer`]. Construct one via [`RagPipeline::builder()`].

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::ingest::{IngestReport, discover_markdown_files};
use crate::synthesizer::AnswerSynthesizer;
use crate::vectorstore::VectorStore;

/// Canned response when retrieval finds nothing to ground an answer in.
pub const NO_RELEVANT_CONTENT: &str =
    "I couldn't find any relevant content in the textbook to answer your question.";

/// A synthesized answer together with the retrieval results it was grounded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The answer text.
    pub answer: String,
    /// The retrieval results used as context, in ranked order. Empty when no
    /// relevant content was found.
    pub sources: Vec<SearchResult>,
}

/// The RAG pipeline orchestrator.
pub struct RagPipeline {
    config: RagConfig,
    collection: String,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Name of the collection this pipeline reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the configured collection in the vector store if it does not
    /// exist, sized to the embedding provider's dimensionality.
    pub async fn init_collection(&self) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(&self.collection, dimensions).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "failed to create collection");
            RagError::Pipeline(format!("failed to create collection '{}': {e}", self.collection))
        })
    }

    /// Ingest a single document: split into sections, chunk, embed, upsert.
    ///
    /// Returns the chunks that were stored, with embeddings attached.
    pub async fn ingest_document(
        &self,
        document: &Document,
        chunker: &dyn Chunker,
    ) -> Result<Vec<Chunk>> {
        let mut chunks = chunker.chunk(document);
        if chunks.is_empty() {
            info!(source = %document.source_file, chunk_count = 0, "ingested document (empty)");
            return Ok(chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embed_chunks(&document.source_file, &texts).await?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.vector_store.upsert(&self.collection, &chunks).await.map_err(|e| {
            error!(source = %document.source_file, error = %e, "upsert failed during ingestion");
            RagError::Pipeline(format!("upsert failed for '{}': {e}", document.source_file))
        })?;

        info!(source = %document.source_file, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Ingest every markdown file under `source`.
    ///
    /// Files are read, chunked, and embedded one at a time; all resulting
    /// chunks are upserted in a single batch at the end of the run. A failure
    /// on one file records an error and continues with the rest; an upsert
    /// failure records an error without rolling back per-file accounting.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SourceNotFound`] if `source` is missing or not a
    /// directory. All other failures are recovered into the report.
    pub async fn ingest_dir(&self, source: &Path, chunker: &dyn Chunker) -> Result<IngestReport> {
        let files = discover_markdown_files(source)?;
        let mut report = IngestReport { discovered_files: files.len(), ..Default::default() };

        if files.is_empty() {
            report.record_error(format!("No markdown files found in {}", source.display()));
            return Ok(report);
        }

        let mut pending: Vec<Chunk> = Vec::new();
        for path in &files {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    report.record_error(format!("Error reading file {}: {e}", path.display()));
                    continue;
                }
            };

            let document = Document::new(path.display().to_string(), content);
            let mut chunks = chunker.chunk(&document);
            if !chunks.is_empty() {
                let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
                match self.embed_chunks(&document.source_file, &texts).await {
                    Ok(embeddings) => {
                        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
                            chunk.embedding = embedding;
                        }
                    }
                    Err(e) => {
                        report.record_error(format!(
                            "Error processing file {}: {e}",
                            path.display()
                        ));
                        continue;
                    }
                }
            }

            report.processed_files += 1;
            report.total_chunks += chunks.len();
            pending.extend(chunks);
        }

        if !pending.is_empty() {
            info!(count = pending.len(), collection = %self.collection, "upserting chunks");
            if let Err(e) = self.vector_store.upsert(&self.collection, &pending).await {
                error!(error = %e, "batch upsert failed");
                report.record_error(format!("Error upserting vectors: {e}"));
            }
        }

        info!(
            processed_files = report.processed_files,
            total_chunks = report.total_chunks,
            error_count = report.errors.len(),
            "ingest run completed"
        );
        Ok(report)
    }

    /// Embed a query and return the `limit` nearest chunks, ranked by
    /// descending similarity. Results are returned unmodified; no threshold
    /// or re-ranking is applied.
    pub async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            RagError::Pipeline(format!("query embedding failed: {e}"))
        })?;

        self.vector_store.search(&self.collection, &query_embedding, limit).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "vector store search failed");
            RagError::Pipeline(format!("search failed in collection '{}': {e}", self.collection))
        })
    }

    /// Answer a question grounded in retrieved textbook content.
    ///
    /// When retrieval returns nothing, the synthesizer is not invoked and the
    /// answer is the [`NO_RELEVANT_CONTENT`] response with empty sources.
    pub async fn answer(&self, query: &str) -> Result<RagAnswer> {
        let sources = self.retrieve(query, self.config.top_k).await?;
        if sources.is_empty() {
            info!("no relevant content found, skipping synthesis");
            return Ok(RagAnswer { answer: NO_RELEVANT_CONTENT.to_string(), sources });
        }

        let answer = self.synthesizer.answer(query, &sources).await?;
        info!(source_count = sources.len(), "answer synthesized");
        Ok(RagAnswer { answer, sources })
    }

    async fn embed_chunks(&self, source: &str, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.embedding_provider.embed_batch(texts).await.map_err(|e| {
            error!(source, error = %e, "embedding failed during ingestion");
            RagError::Pipeline(format!("embedding failed for '{source}': {e}"))
        })?;
        if embeddings.len() != texts.len() {
            return Err(RagError::Pipeline(format!(
                "embedding count mismatch for '{source}': {} texts, {} vectors",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The three collaborators and the collection name are required; `config`
/// falls back to [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    collection: Option<String>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector collection name.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let collection = self
            .collection
            .ok_or_else(|| RagError::Config("collection is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| RagError::Config("synthesizer is required".to_string()))?;

        Ok(RagPipeline { config, collection, embedding_provider, vector_store, synthesizer })
    }
}
