use folio_memory::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("retrieval error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RagError>;
