use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, VisionProvider};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_SECS: u64 = 1;

const CAPTION_INSTRUCTION: &str =
    "Describe this image in one or two sentences so it can be found by a text search.";
const OCR_INSTRUCTION: &str =
    "Transcribe all text visible in this image. Return only the transcribed text, \
     or an empty response if there is none.";

/// Gemini `generateContent` / `embedContent` backend.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    vision_model: String,
    embedding_model: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("vision_model", &self.vision_model)
            .field("embedding_model", &self.embedding_model)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        let vision_model = model.clone();
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model,
            vision_model,
            embedding_model: "text-embedding-004".into(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = model.into();
        self
    }

    #[must_use]
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn endpoint(&self, model: &str, action: &str) -> String {
        format!("{}/models/{model}:{action}", self.base_url)
    }

    async fn generate_content(&self, model: &str, parts: Vec<Part>) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: vec![Content { parts }],
        };

        for attempt in 0..=MAX_RETRIES {
            let response = self
                .client
                .post(self.endpoint(model, "generateContent"))
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RETRIES {
                    return Err(LlmError::RateLimited);
                }
                let delay = Duration::from_secs(BASE_BACKOFF_SECS << attempt);
                tracing::warn!(
                    "Gemini rate limited, retrying in {}s (attempt {}/{})",
                    delay.as_secs(),
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = response.text().await.map_err(LlmError::Http)?;

            if !status.is_success() {
                tracing::error!("Gemini API error {status}: {text}");
                return Err(LlmError::Other(format!(
                    "Gemini API request failed (status {status})"
                )));
            }

            let resp: GenerateResponse = serde_json::from_str(&text)?;
            return resp
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .and_then(|p| p.text)
                .filter(|t| !t.is_empty())
                .ok_or(LlmError::EmptyResponse { provider: "gemini" });
        }

        Err(LlmError::RateLimited)
    }

    async fn vision_call(
        &self,
        instruction: &str,
        image: &[u8],
        mime: &str,
    ) -> Result<String, LlmError> {
        let data = base64::engine::general_purpose::STANDARD.encode(image);
        let parts = vec![
            Part::text(instruction),
            Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime.into(),
                    data,
                }),
            },
        ];
        self.generate_content(&self.vision_model, parts).await
    }
}

impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_content(&self.model, vec![Part::text(prompt)])
            .await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let body = EmbedRequest {
            content: Content {
                parts: vec![Part::text(text)],
            },
        };

        let response = self
            .client
            .post(self.endpoint(&self.embedding_model, "embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini embedding error {status}: {text}");
            return Err(LlmError::Other(format!(
                "Gemini embedding request failed (status {status})"
            )));
        }

        let resp: EmbedResponse = serde_json::from_str(&text)?;
        if resp.embedding.values.is_empty() {
            return Err(LlmError::EmptyResponse { provider: "gemini" });
        }
        Ok(resp.embedding.values)
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

impl VisionProvider for GeminiProvider {
    async fn describe_image(&self, image: &[u8], mime: &str) -> Result<String, LlmError> {
        self.vision_call(CAPTION_INSTRUCTION, image, mime).await
    }

    async fn extract_text(&self, image: &[u8], mime: &str) -> Result<String, LlmError> {
        self.vision_call(OCR_INSTRUCTION, image, mime).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct EmbedRequest {
    content: Content,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
