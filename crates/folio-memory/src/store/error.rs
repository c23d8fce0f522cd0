#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Qdrant error: {0}")]
    Qdrant(#[from] Box<qdrant_client::QdrantError>),

    #[error("embedding error: {0}")]
    Embedding(#[from] folio_llm::LlmError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Other(String),
}
