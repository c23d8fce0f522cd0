use axum::Router;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use folio_llm::{LlmProvider, VisionProvider};

use crate::handlers::{
    health_handler, notes_handler, query_handler, summary_handler, upload_handler,
};
use crate::server::AppState;

pub(crate) fn build_router<P, V>(state: AppState<P, V>, max_body_size: usize) -> Router
where
    P: LlmProvider + 'static,
    V: VisionProvider + 'static,
{
    Router::new()
        .route("/upload", post(upload_handler::<P, V>))
        .route("/query", post(query_handler::<P, V>))
        .route("/notes", post(notes_handler::<P, V>))
        .route("/summary", post(summary_handler::<P, V>))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .route("/health", get(health_handler::<P, V>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
