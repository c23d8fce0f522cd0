use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use folio_llm::{LlmProvider, VisionProvider};
use folio_memory::document::{ImageRecord, IngestReport, Section};
use folio_rag::QueryResponse;

use crate::error::ApiError;
use crate::server::AppState;

/// Pre-parsed document as produced by upstream extraction and
/// classification. A section missing its `content` field fails
/// deserialization here, before any chunking runs.
#[derive(serde::Deserialize)]
pub(crate) struct UploadPayload {
    pub document_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

#[derive(serde::Deserialize)]
pub(crate) struct QueryPayload {
    pub query: String,
}

/// Inline text wins over a document reference.
#[derive(serde::Deserialize)]
pub(crate) struct TextPayload {
    pub text: Option<String>,
    pub document_id: Option<String>,
}

#[derive(serde::Serialize)]
struct NotesResponse {
    notes: String,
}

#[derive(serde::Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn upload_handler<P: LlmProvider + 'static, V: VisionProvider + 'static>(
    State(state): State<AppState<P, V>>,
    Json(payload): Json<UploadPayload>,
) -> Result<Json<IngestReport>, ApiError> {
    let document_id = payload
        .document_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let report = state
        .pipeline
        .ingest(&document_id, &payload.text, payload.sections, payload.images)
        .await?;

    state
        .documents
        .write()
        .await
        .insert(document_id, payload.text);

    Ok(Json(report))
}

pub(crate) async fn query_handler<P: LlmProvider + 'static, V: VisionProvider + 'static>(
    State(state): State<AppState<P, V>>,
    Json(payload): Json<QueryPayload>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = state.engine.answer(&payload.query).await?;
    Ok(Json(response))
}

pub(crate) async fn notes_handler<P: LlmProvider + 'static, V: VisionProvider + 'static>(
    State(state): State<AppState<P, V>>,
    Json(payload): Json<TextPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let text = resolve_text(&state, payload).await?;
    let notes = state.engine.quick_notes(&text).await;
    Ok(Json(NotesResponse { notes }))
}

pub(crate) async fn summary_handler<P: LlmProvider + 'static, V: VisionProvider + 'static>(
    State(state): State<AppState<P, V>>,
    Json(payload): Json<TextPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let text = resolve_text(&state, payload).await?;
    let summary = state.engine.summarize(&text).await;
    Ok(Json(SummaryResponse { summary }))
}

pub(crate) async fn health_handler<P: LlmProvider + 'static, V: VisionProvider + 'static>(
    State(state): State<AppState<P, V>>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn resolve_text<P, V: VisionProvider>(
    state: &AppState<P, V>,
    payload: TextPayload,
) -> Result<String, ApiError> {
    if let Some(text) = payload.text
        && !text.trim().is_empty()
    {
        return Ok(text);
    }
    if let Some(id) = payload.document_id {
        return state
            .documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::UnknownDocument(id));
    }
    Err(ApiError::MissingText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_payload_rejects_section_without_content() {
        let json = r#"{"text":"t","sections":[{"heading":"H"}]}"#;
        assert!(serde_json::from_str::<UploadPayload>(json).is_err());
    }

    #[test]
    fn upload_payload_defaults_optional_parts() {
        let json = r#"{"text":"full document text"}"#;
        let payload: UploadPayload = serde_json::from_str(json).unwrap();
        assert!(payload.document_id.is_none());
        assert!(payload.sections.is_empty());
        assert!(payload.images.is_empty());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
