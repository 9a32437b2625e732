use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use textbook_rag::config::{EmbeddingBackend, ServiceConfig, VectorBackend};
use textbook_rag::embedding::{EmbeddingProvider, HashEmbeddingProvider};
use textbook_rag::inmemory::InMemoryVectorStore;
use textbook_rag::openai::{OpenAiEmbeddingProvider, OpenAiSynthesizer};
use textbook_rag::pipeline::RagPipeline;
use textbook_rag::qdrant::QdrantVectorStore;
use textbook_rag::server::{AppState, run_server};
use textbook_rag::vectorstore::VectorStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServiceConfig::from_env().context("loading configuration")?;

    let embedding_provider: Arc<dyn EmbeddingProvider> = match config.embedding_backend {
        EmbeddingBackend::OpenAi => {
            let Some(api_key) = config.openai_api_key.clone() else {
                bail!("OPENAI_API_KEY is required for the openai embedding backend");
            };
            Arc::new(OpenAiEmbeddingProvider::new(api_key)?)
        }
        EmbeddingBackend::Hash => {
            info!("using deterministic hash embeddings");
            Arc::new(HashEmbeddingProvider::default())
        }
    };

    let vector_store: Arc<dyn VectorStore> = match config.vector_backend {
        VectorBackend::Qdrant => Arc::new(QdrantVectorStore::new(
            &config.qdrant_url,
            config.qdrant_api_key.clone(),
        )?),
        VectorBackend::InMemory => {
            info!("using in-memory vector store; contents are lost on restart");
            Arc::new(InMemoryVectorStore::new())
        }
    };

    let Some(api_key) = config.openai_api_key.clone() else {
        bail!("OPENAI_API_KEY is required for answer synthesis");
    };
    let synthesizer = Arc::new(OpenAiSynthesizer::new(api_key)?);

    let pipeline = RagPipeline::builder()
        .config(config.rag.clone())
        .collection(config.collection_name.clone())
        .embedding_provider(embedding_provider)
        .vector_store(vector_store)
        .synthesizer(synthesizer)
        .build()?;
    pipeline.init_collection().await.context("initializing vector collection")?;

    run_server(&config, AppState { pipeline: Arc::new(pipeline) }).await
}
