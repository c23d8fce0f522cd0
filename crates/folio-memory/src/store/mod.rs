//! The index store boundary: similarity queries over text and image chunks.

pub mod bundle;
pub mod error;
pub mod in_memory;
pub mod qdrant;

use std::future::Future;
use std::pin::Pin;

use crate::document::types::{Chunk, ImageChunk};
pub use bundle::{ChunkMetadata, ImageItem, ImageMetadata, RetrievalBundle, RetrievedItem};
pub use error::StoreError;
pub use in_memory::InMemoryStore;
pub use qdrant::QdrantStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text and image index backend.
///
/// Writes are fire-and-forget from the core's perspective; what repeated
/// ingestion of the same document does (overwrite, duplicate, reject) is
/// the implementation's policy.
pub trait DocumentStore: Send + Sync {
    /// Similarity query over the text index.
    fn query_similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>>;

    /// Similarity query over the image index, scoped to one document.
    fn query_images_for_document(
        &self,
        query: &str,
        document_id: &str,
        limit: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>>;

    /// Text chunks recorded for one page of one document.
    fn text_for_page(
        &self,
        document_id: &str,
        page: u32,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    fn upsert_chunks(&self, chunks: Vec<Chunk>) -> BoxFuture<'_, Result<(), StoreError>>;

    fn upsert_images(&self, images: Vec<ImageChunk>) -> BoxFuture<'_, Result<(), StoreError>>;
}
