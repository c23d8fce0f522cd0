use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{RwLock, watch};

use folio_llm::{LlmProvider, VisionProvider};
use folio_memory::document::IngestionPipeline;
use folio_rag::RagEngine;

use crate::error::GatewayError;
use crate::router::build_router;

/// Shared handler state. `documents` caches the extracted text of every
/// uploaded document by id, so notes/summary requests can reference a
/// document instead of resending its text.
pub(crate) struct AppState<P, V: VisionProvider> {
    pub engine: Arc<RagEngine<P>>,
    pub pipeline: Arc<IngestionPipeline<V>>,
    pub documents: Arc<RwLock<HashMap<String, String>>>,
    pub started_at: Instant,
}

impl<P, V: VisionProvider> Clone for AppState<P, V> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            pipeline: Arc::clone(&self.pipeline),
            documents: Arc::clone(&self.documents),
            started_at: self.started_at,
        }
    }
}

pub struct GatewayServer<P, V: VisionProvider> {
    addr: SocketAddr,
    max_body_size: usize,
    engine: Arc<RagEngine<P>>,
    pipeline: Arc<IngestionPipeline<V>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<P, V> GatewayServer<P, V>
where
    P: LlmProvider + 'static,
    V: VisionProvider + 'static,
{
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        engine: Arc<RagEngine<P>>,
        pipeline: Arc<IngestionPipeline<V>>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        Self {
            addr,
            max_body_size: 10_485_760,
            engine,
            pipeline,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Start the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal
    /// I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState {
            engine: self.engine,
            pipeline: self.pipeline,
            documents: Arc::new(RwLock::new(HashMap::new())),
            started_at: Instant::now(),
        };

        let router = build_router(state, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
