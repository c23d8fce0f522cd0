//! Document model, chunking, image enrichment, and the index store boundary.

pub mod document;
pub mod store;
pub mod text;

pub use document::{Chunk, ImageChunk, ImageRecord, IngestionPipeline, Section, chunk_sections};
pub use store::{DocumentStore, RetrievalBundle, StoreError};
