//! Retrieval context assembly and grounded answering.
//!
//! The policy layer between similarity search and generation: ranking and
//! truncating retrieved text, fusing image hits with page-level context,
//! and formatting the single grounded-answer instruction.

pub mod assembler;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod prompt;

pub use assembler::{ContextBlock, DEFAULT_MAX_ITEMS, assemble, render_block};
pub use engine::{NO_CONTEXT_ANSWER, QueryResponse, RagConfig, RagEngine, SectionSummary};
pub use error::RagError;
pub use fusion::ImageResult;
