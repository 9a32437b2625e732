//! End-to-end pipeline tests over the in-memory store and the deterministic
//! embedding stub. No external services are involved.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use textbook_rag::chunking::FixedWindowChunker;
use textbook_rag::config::RagConfig;
use textbook_rag::document::{Document, SearchResult};
use textbook_rag::embedding::HashEmbeddingProvider;
use textbook_rag::error::{RagError, Result};
use textbook_rag::inmemory::InMemoryVectorStore;
use textbook_rag::pipeline::{NO_RELEVANT_CONTENT, RagPipeline};
use textbook_rag::synthesizer::AnswerSynthesizer;

/// Reports how many context items it was handed.
struct CountingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for CountingSynthesizer {
    async fn answer(&self, _query: &str, context: &[SearchResult]) -> Result<String> {
        Ok(format!("answer grounded in {} sources", context.len()))
    }
}

/// Fails the test if synthesis is ever attempted.
struct PanickingSynthesizer;

#[async_trait]
impl AnswerSynthesizer for PanickingSynthesizer {
    async fn answer(&self, _query: &str, _context: &[SearchResult]) -> Result<String> {
        panic!("synthesizer must not be called without retrieved context");
    }
}

async fn test_pipeline(synthesizer: Arc<dyn AnswerSynthesizer>) -> RagPipeline {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::builder().chunk_size(80).chunk_overlap(20).top_k(5).build().unwrap())
        .collection("test_content")
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .synthesizer(synthesizer)
        .build()
        .unwrap();
    pipeline.init_collection().await.unwrap();
    pipeline
}

fn default_chunker() -> FixedWindowChunker {
    FixedWindowChunker::new(80, 20)
}

#[tokio::test]
async fn ingest_dir_skips_unreadable_file_and_processes_the_rest() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("chapter1.md"), "# Sensors\nRobots perceive the world with sensors.")
        .unwrap();
    fs::write(root.join("chapter2.md"), "# Actuators\nActuators move joints and wheels.").unwrap();
    // Invalid UTF-8 makes the read fail without touching permissions.
    fs::write(root.join("broken.md"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    let report = pipeline.ingest_dir(root, &default_chunker()).await.unwrap();

    assert_eq!(report.processed_files, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("broken.md"));
    assert!(report.total_chunks >= 2);

    // Chunks from the readable files were still stored.
    let results = pipeline.retrieve("sensors", 10).await.unwrap();
    assert!(!results.is_empty());
    let sections: Vec<&str> = results.iter().map(|r| r.chunk.source_section.as_str()).collect();
    assert!(sections.contains(&"Sensors") || sections.contains(&"Actuators"));
}

#[tokio::test]
async fn ingest_dir_reports_when_no_markdown_is_found() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("readme.txt"), "not markdown").unwrap();

    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    let report = pipeline.ingest_dir(temp.path(), &default_chunker()).await.unwrap();

    assert_eq!(report.discovered_files, 0);
    assert_eq!(report.processed_files, 0);
    assert_eq!(report.total_chunks, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("No markdown files found"));
}

#[tokio::test]
async fn ingest_dir_rejects_missing_source() {
    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    let err = pipeline
        .ingest_dir(Path::new("/definitely/not/a/dir"), &default_chunker())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::SourceNotFound(_)));
}

#[tokio::test]
async fn ingest_document_stores_chunks_and_returns_them_with_embeddings() {
    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    let document =
        Document::new("manual.md", "# Control\nPID controllers regulate joint torque.");

    let chunks = pipeline.ingest_document(&document, &default_chunker()).await.unwrap();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| !c.embedding.is_empty()));
    assert!(chunks.iter().all(|c| c.source_file == "manual.md"));

    let results = pipeline.retrieve("joint torque", 5).await.unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].chunk.source_file, "manual.md");
    assert_eq!(results[0].chunk.source_section, "Control");
}

#[tokio::test]
async fn ingest_document_with_empty_text_stores_nothing() {
    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;

    let chunks = pipeline
        .ingest_document(&Document::new("empty.md", ""), &default_chunker())
        .await
        .unwrap();
    assert!(chunks.is_empty());

    let results = pipeline.retrieve("anything", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn reingesting_the_same_documents_does_not_duplicate_chunks() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.md"), "# Stable\nThe same content every time.").unwrap();

    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    let first = pipeline.ingest_dir(temp.path(), &default_chunker()).await.unwrap();
    let second = pipeline.ingest_dir(temp.path(), &default_chunker()).await.unwrap();
    assert_eq!(first.total_chunks, second.total_chunks);

    // Content-addressed ids make the second run overwrite the first.
    let results = pipeline.retrieve("stable", 100).await.unwrap();
    assert_eq!(results.len(), first.total_chunks);
}

#[tokio::test]
async fn answer_short_circuits_on_empty_retrieval() {
    let pipeline = test_pipeline(Arc::new(PanickingSynthesizer)).await;

    let result = pipeline.answer("anything at all").await.unwrap();
    assert_eq!(result.answer, NO_RELEVANT_CONTENT);
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn answer_is_grounded_in_retrieved_sources() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(
        temp.path().join("doc.md"),
        "# Grounding\nLocomotion strategies include walking, rolling, and hopping.",
    )
    .unwrap();

    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    pipeline.ingest_dir(temp.path(), &default_chunker()).await.unwrap();

    let result = pipeline.answer("how do robots move?").await.unwrap();
    assert!(result.answer.starts_with("answer grounded in"));
    assert!(!result.sources.is_empty());
    assert_eq!(result.sources[0].chunk.source_file, temp.path().join("doc.md").display().to_string());
}

#[tokio::test]
async fn retrieved_chunks_round_trip_their_provenance() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("doc.md"), "# Provenance\nA short body under one heading.").unwrap();

    let pipeline = test_pipeline(Arc::new(CountingSynthesizer)).await;
    pipeline.ingest_dir(temp.path(), &default_chunker()).await.unwrap();

    let results = pipeline.retrieve("provenance", 5).await.unwrap();
    let chunk = &results[0].chunk;
    assert_eq!(chunk.source_section, "Provenance");
    assert!(chunk.id.starts_with("chunk_"));
    assert!(chunk.embedding.is_empty());
}
