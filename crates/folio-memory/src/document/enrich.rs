//! Ingestion-time image enrichment.
//!
//! Caption and OCR are attempted independently per image; a failure in one
//! substitutes its fallback without touching the other, and never aborts
//! the rest of the batch. Non-empty OCR is appended to the stored caption
//! so the image is searchable both on its visual description and on its
//! on-image text.

use futures::future::join_all;

use super::types::{ImageChunk, ImageRecord};
use crate::text::truncate_chars;
use folio_llm::provider::VisionProvider;

/// OCR snippet cap when appended to the stored caption.
pub const OCR_SNIPPET_MAX_CHARS: usize = 400;

const CAPTION_FALLBACK: &str = "Image";
const OCR_SEPARATOR: &str = "\nOCR: ";

/// Enrich a batch of extracted images.
///
/// Images run as independent futures joined before the caller's single
/// index write; per-image results carry no ordering dependency on each
/// other, so output order matches input order regardless of completion
/// order.
pub async fn enrich_images<V: VisionProvider>(
    vision: &V,
    images: &[ImageRecord],
) -> Vec<ImageChunk> {
    join_all(images.iter().map(|record| enrich_one(vision, record))).await
}

async fn enrich_one<V: VisionProvider>(vision: &V, record: &ImageRecord) -> ImageChunk {
    let bytes = match tokio::fs::read(&record.path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(image = %record.id, "image read failed: {e}");
            None
        }
    };

    let (caption, ocr) = match bytes {
        Some(bytes) => {
            let mime = mime_for_path(&record.path);

            let caption = match vision.describe_image(&bytes, mime).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => CAPTION_FALLBACK.to_owned(),
                Err(e) => {
                    tracing::warn!(image = %record.id, "caption generation failed: {e}");
                    CAPTION_FALLBACK.to_owned()
                }
            };

            let ocr = match vision.extract_text(&bytes, mime).await {
                Ok(text) => text.trim().to_owned(),
                Err(e) => {
                    tracing::warn!(image = %record.id, "OCR extraction failed: {e}");
                    String::new()
                }
            };

            (caption, ocr)
        }
        None => (CAPTION_FALLBACK.to_owned(), String::new()),
    };

    let stored_caption = if ocr.is_empty() {
        caption
    } else {
        format!(
            "{caption}{OCR_SEPARATOR}{}",
            truncate_chars(&ocr, OCR_SNIPPET_MAX_CHARS)
        )
    };

    ImageChunk {
        id: record.id.clone(),
        caption: stored_caption,
        ocr,
        page: record.page,
        document_id: record.document_id.clone(),
        path: record.path.clone(),
    }
}

fn mime_for_path(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
