//! Test-only mock providers.

use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{LlmProvider, VisionProvider};

/// Scripted generation backend that records every prompt it receives.
#[derive(Debug, Clone)]
pub struct MockLlm {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub supports_embeddings: bool,
    pub fail_generate: bool,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock answer".into(),
            embedding: vec![0.0; 8],
            supports_embeddings: false,
            fail_generate: false,
        }
    }
}

impl MockLlm {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embeddings(mut self) -> Self {
        self.supports_embeddings = true;
        self
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    #[must_use]
    pub fn generate_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl LlmProvider for MockLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        if self.fail_generate {
            return Err(LlmError::Other("mock generate error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        if self.supports_embeddings {
            Ok(self.embedding.clone())
        } else {
            Err(LlmError::EmbedUnsupported { provider: "mock" })
        }
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Content-addressed vision double.
///
/// Behavior is keyed on the image bytes so results stay deterministic when
/// enrichment runs images concurrently: bytes containing `caption-fail` fail
/// the caption call, `ocr-fail` fails the OCR call, `no-text` yields empty
/// OCR output. All other inputs echo their bytes back.
#[derive(Debug, Clone, Default)]
pub struct MockVision;

impl VisionProvider for MockVision {
    async fn describe_image(&self, image: &[u8], _mime: &str) -> Result<String, LlmError> {
        let tag = String::from_utf8_lossy(image);
        if tag.contains("caption-fail") {
            return Err(LlmError::Other("mock caption error".into()));
        }
        Ok(format!("caption of {tag}"))
    }

    async fn extract_text(&self, image: &[u8], _mime: &str) -> Result<String, LlmError> {
        let tag = String::from_utf8_lossy(image);
        if tag.contains("ocr-fail") {
            return Err(LlmError::Other("mock ocr error".into()));
        }
        if tag.contains("no-text") {
            return Ok(String::new());
        }
        Ok(format!("text in {tag}"))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_consumed_in_order() {
        let llm = MockLlm::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(llm.generate("a").await.unwrap(), "first");
        assert_eq!(llm.generate("b").await.unwrap(), "second");
        assert_eq!(llm.generate("c").await.unwrap(), "mock answer");
        assert_eq!(llm.generate_calls(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors_but_records_prompt() {
        let llm = MockLlm::failing();
        assert!(llm.generate("boom").await.is_err());
        assert_eq!(llm.prompts(), vec!["boom".to_owned()]);
    }

    #[tokio::test]
    async fn vision_echoes_bytes() {
        let vision = MockVision;
        let caption = vision.describe_image(b"fig1", "image/png").await.unwrap();
        assert_eq!(caption, "caption of fig1");
        let ocr = vision.extract_text(b"fig1", "image/png").await.unwrap();
        assert_eq!(ocr, "text in fig1");
    }

    #[tokio::test]
    async fn vision_failure_markers() {
        let vision = MockVision;
        assert!(
            vision
                .describe_image(b"caption-fail", "image/png")
                .await
                .is_err()
        );
        assert!(vision.extract_text(b"ocr-fail", "image/png").await.is_err());
        let empty = vision.extract_text(b"no-text", "image/png").await.unwrap();
        assert!(empty.is_empty());
    }
}
