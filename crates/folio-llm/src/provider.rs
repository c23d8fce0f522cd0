use std::pin::Pin;

use crate::error::LlmError;

/// Boxed embedding future, for callers that hold an embedder as a closure.
pub type EmbedFuture = Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send>>;

/// Text generation and embedding backend.
///
/// One `generate` call per request; retry and timeout policy live inside
/// the implementation, never in the callers.
pub trait LlmProvider: Send + Sync {
    /// Send a single prompt and return the model's text response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to communicate or the response
    /// is empty or invalid.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Embed text into a vector for similarity search.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::EmbedUnsupported`] unless the provider overrides it.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send {
        let _ = text;
        let provider = self.name();
        async move { Err(LlmError::EmbedUnsupported { provider }) }
    }

    fn supports_embeddings(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Image understanding backend: visual description and on-image text.
///
/// The two operations are independent; enrichment callers treat each
/// failure in isolation.
pub trait VisionProvider: Send + Sync {
    /// Describe the image for retrieval (a generated caption).
    ///
    /// # Errors
    ///
    /// Returns an error if the vision call fails or yields no text.
    fn describe_image(
        &self,
        image: &[u8],
        mime: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Transcribe text visible in the image (OCR).
    ///
    /// # Errors
    ///
    /// Returns an error if the vision call fails or yields no text.
    fn extract_text(
        &self,
        image: &[u8],
        mime: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    fn name(&self) -> &'static str;
}
