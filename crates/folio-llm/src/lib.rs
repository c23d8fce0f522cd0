//! Provider abstraction for generation, vision, and embedding calls.

pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;

pub use error::LlmError;
pub use provider::{LlmProvider, VisionProvider};
