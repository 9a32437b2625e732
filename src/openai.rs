//! OpenAI-backed embedding provider and answer synthesizer.
//!
//! Both types call the OpenAI REST API directly via `reqwest`. Only available
//! when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::synthesizer::AnswerSynthesizer;

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Dimensionality of `text-embedding-3-small`.
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Default chat model for answer synthesis.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

fn embedding_error(message: impl Into<String>) -> RagError {
    RagError::Embedding { provider: "openai".to_string(), message: message.into() }
}

fn synthesis_error(message: impl Into<String>) -> RagError {
    RagError::Synthesis { provider: "openai".to_string(), message: message.into() }
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Decode an error body into its `message`, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider with the given API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Override the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the output dimensionality (passed to the API for models that
    /// support truncated embeddings).
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| embedding_error("API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(batch_size = texts.len(), model = %self.model, "embedding batch");

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: texts.to_vec() })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "embedding request failed");
                embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "embeddings API error");
            return Err(embedding_error(format!("API returned {status}: {}", error_detail(&body))));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| embedding_error(format!("failed to parse response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(embedding_error(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Answer synthesis ───────────────────────────────────────────────

/// An [`AnswerSynthesizer`] backed by the OpenAI chat completions API.
///
/// Formats the retrieved chunks into a context block and asks the model to
/// answer from that context only, citing sources where possible.
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

const SYSTEM_PROMPT: &str = "You are an AI assistant for the Physical AI & Humanoid Robotics \
Textbook. Use the following context to answer the user's question. If the context doesn't \
contain the information needed to answer the question, say so. Always cite sources when possible.";

impl OpenAiSynthesizer {
    /// Create a synthesizer with the given API key and the default chat model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Synthesis`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(synthesis_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Override the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl AnswerSynthesizer for OpenAiSynthesizer {
    async fn answer(&self, query: &str, context: &[SearchResult]) -> Result<String> {
        let context_text = context
            .iter()
            .map(|r| format!("Source: {}\nContent: {}", r.chunk.source_file, r.chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let user_message = format!(
            "Context: {context_text}\n\nQuestion: {query}\n\nPlease provide a comprehensive \
             answer based on the context provided."
        );

        debug!(model = %self.model, context_items = context.len(), "synthesizing answer");

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_message },
            ],
            max_tokens: 1000,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "chat completion request failed");
                synthesis_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "chat completions API error");
            return Err(synthesis_error(format!("API returned {status}: {}", error_detail(&body))));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| synthesis_error(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| synthesis_error("API returned no choices"))
    }
}
