pub mod chunker;
pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod types;

pub use chunker::{MIN_CHUNK_CHARS, chunk_sections};
pub use enrich::enrich_images;
pub use error::DocumentError;
pub use pipeline::{IngestReport, IngestionPipeline};
pub use types::{Chunk, Difficulty, DiscourseType, ImageChunk, ImageRecord, Section};
