use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::watch;

use folio_gateway::GatewayServer;
use folio_llm::LlmProvider;
use folio_llm::gemini::GeminiProvider;
use folio_memory::document::IngestionPipeline;
use folio_memory::store::qdrant::EmbedFn;
use folio_memory::store::{DocumentStore, InMemoryStore, QdrantStore};
use folio_rag::{RagConfig, RagEngine};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "folio", version, about = "Study-document RAG backend")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        bail!("GEMINI_API_KEY is not set");
    }

    let mut provider = GeminiProvider::new(api_key, config.llm.model.clone())
        .with_vision_model(config.llm.vision_model.clone())
        .with_embedding_model(config.llm.embedding_model.clone());
    if let Some(ref base_url) = config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    let provider = Arc::new(provider);

    let store = build_store(&config, &provider).await?;

    let engine = Arc::new(RagEngine::new(
        Arc::clone(&provider),
        Arc::clone(&store),
        RagConfig {
            top_k: config.retrieval.top_k,
            max_items: config.retrieval.max_items,
            image_limit: config.retrieval.image_limit,
        },
    ));
    let pipeline = Arc::new(IngestionPipeline::new(store, Arc::clone(&provider)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            return;
        }
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    GatewayServer::new(
        &config.server.bind,
        config.server.port,
        engine,
        pipeline,
        shutdown_rx,
    )
    .with_max_body_size(config.server.max_body_bytes)
    .serve()
    .await?;

    Ok(())
}

async fn build_store(
    config: &Config,
    provider: &Arc<GeminiProvider>,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "qdrant" => {
            let embedder = Arc::clone(provider);
            let embed: EmbedFn = Box::new(move |text| {
                let provider = Arc::clone(&embedder);
                let text = text.to_owned();
                Box::pin(async move { provider.embed(&text).await })
            });
            let store = QdrantStore::new(&config.store.qdrant_url, embed)
                .context("failed to build qdrant client")?;
            store
                .ensure_collections(config.store.vector_size)
                .await
                .context("failed to prepare qdrant collections")?;
            Ok(Arc::new(store))
        }
        other => bail!("unknown store backend: {other}"),
    }
}
