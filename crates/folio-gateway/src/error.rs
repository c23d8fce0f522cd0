use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use folio_memory::document::DocumentError;
use folio_rag::RagError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}

/// Per-request failure, mapped to an HTTP status and a JSON error body.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("no text supplied and no document_id given")]
    MissingText,
    #[error("unknown document: {0}")]
    UnknownDocument(String),
    #[error(transparent)]
    Ingest(#[from] DocumentError),
    #[error(transparent)]
    Query(#[from] RagError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingText | Self::UnknownDocument(_) => StatusCode::BAD_REQUEST,
            Self::Ingest(_) | Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
