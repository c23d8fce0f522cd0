#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("storage error: {0}")]
    Storage(#[from] crate::store::StoreError),
}
