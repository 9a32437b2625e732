//! Answer synthesizer trait.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// Drafts a grounded answer to a query from retrieved context.
///
/// Implementations receive the retrieval results in ranked order and are
/// expected to cite the source files they draw from. The pipeline never calls
/// a synthesizer with empty context; the no-relevant-content case is handled
/// before synthesis.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Produce an answer to `query` grounded in `context`.
    async fn answer(&self, query: &str, context: &[SearchResult]) -> Result<String>;
}
