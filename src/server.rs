//! HTTP surface for ingest and chat.
//!
//! Thin axum handlers over [`RagPipeline`]: request validation and
//! response shaping live here, orchestration lives in the pipeline.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chunking::FixedWindowChunker;
use crate::config::{RagConfig, ServiceConfig};
use crate::error::RagError;
use crate::pipeline::RagPipeline;

/// Maximum length of a source excerpt returned by the chat endpoint.
const SOURCE_EXCERPT_CHARS: usize = 200;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline all requests are served from.
    pub pipeline: Arc<RagPipeline>,
}

/// Request body for `POST /api/v1/ingest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Directory to scan for markdown files.
    pub source_path: String,
    /// Chunk size override; falls back to the configured default.
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Chunk overlap override; falls back to the configured default.
    #[serde(default)]
    pub chunk_overlap: Option<usize>,
}

/// Overall outcome of an ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    /// At least one file was processed (errors may still be listed).
    Success,
    /// Nothing was processed and errors occurred.
    Error,
}

/// Response body for `POST /api/v1/ingest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Overall run outcome.
    pub status: IngestStatus,
    /// Number of files successfully processed.
    pub processed_files: usize,
    /// Total chunks created.
    pub total_chunks: usize,
    /// Recovered per-file and upsert errors.
    pub errors: Vec<String>,
    /// Human-readable summary.
    pub message: String,
}

/// Request body for `POST /api/v1/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub query: String,
    /// Conversation identifier; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional caller identifier, echoed nowhere, accepted for forward
    /// compatibility with the frontend widget.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A truncated source excerpt attached to a chat answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceExcerpt {
    /// Chunk text, truncated to 200 characters.
    pub text: String,
    /// Owning document.
    pub source_file: String,
    /// Owning section title.
    pub source_section: String,
    /// Similarity score from retrieval.
    pub score: f32,
}

/// Response body for `POST /api/v1/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The synthesized (or no-relevant-content) answer.
    pub answer: String,
    /// Ranked source excerpts backing the answer.
    pub sources: Vec<SourceExcerpt>,
    /// Conversation identifier.
    pub session_id: String,
    /// The original query, echoed back.
    pub query: String,
    /// RFC 3339 response timestamp.
    pub timestamp: String,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/api/v1/ingest", post(ingest))
        .route("/api/v1/ingest/health", get(ingest_health))
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/chat/health", get(chat_health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve the API until the process is stopped.
pub async fn run_server(config: &ServiceConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for textbook-rag")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("textbook-rag listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Physical AI Textbook RAG API" }))
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "textbook-rag" }))
}

async fn ingest_health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "ingest" }))
}

async fn chat_health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "chat" }))
}

async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let defaults = state.pipeline.config();
    let rag_config = RagConfig::builder()
        .chunk_size(request.chunk_size.unwrap_or(defaults.chunk_size))
        .chunk_overlap(request.chunk_overlap.unwrap_or(defaults.chunk_overlap))
        .top_k(defaults.top_k)
        .build()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    let chunker = FixedWindowChunker::new(rag_config.chunk_size, rag_config.chunk_overlap);

    let report = state
        .pipeline
        .ingest_dir(Path::new(&request.source_path), &chunker)
        .await
        .map_err(|e| match e {
            RagError::SourceNotFound(path) => api_error(
                StatusCode::BAD_REQUEST,
                format!("Source path does not exist or is not a directory: {}", path.display()),
            ),
            other => api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing ingest request: {other}"),
            ),
        })?;

    // An empty source directory is not a failed run.
    let (status, message) = if report.discovered_files == 0 {
        (IngestStatus::Success, "No markdown files to process".to_string())
    } else if report.errors.is_empty() {
        (
            IngestStatus::Success,
            format!(
                "Successfully processed {} files and created {} chunks.",
                report.processed_files, report.total_chunks
            ),
        )
    } else {
        let status =
            if report.processed_files == 0 { IngestStatus::Error } else { IngestStatus::Success };
        (
            status,
            format!(
                "Processing completed with {} errors. See errors list for details.",
                report.errors.len()
            ),
        )
    };

    Ok(Json(IngestResponse {
        status,
        processed_files: report.processed_files,
        total_chunks: report.total_chunks,
        errors: report.errors,
        message,
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = request.session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let result = state.pipeline.answer(&request.query).await.map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing chat request: {e}"),
        )
    })?;

    let sources = result
        .sources
        .iter()
        .map(|r| SourceExcerpt {
            text: truncate_excerpt(&r.chunk.text),
            source_file: r.chunk.source_file.clone(),
            source_section: r.chunk.source_section.clone(),
            score: r.score,
        })
        .collect();

    Ok(Json(ChatResponse {
        answer: result.answer,
        sources,
        session_id,
        query: request.query,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

fn truncate_excerpt(text: &str) -> String {
    if text.chars().count() > SOURCE_EXCERPT_CHARS {
        let head: String = text.chars().take(SOURCE_EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
