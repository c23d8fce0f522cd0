//! Multimodal fusion: attach image hits to a text-grounded answer.
//!
//! Fusion is scoped to a single document (the top text hit's) rather than
//! the full candidate set: the image context should belong to the same
//! document the textual answer is grounded in.

use folio_memory::store::{DocumentStore, ImageItem};
use folio_memory::text::truncate_chars;

/// Cap on the page-level text attached to an image.
pub const PAGE_CONTEXT_MAX_CHARS: usize = 400;

const CAPTION_FALLBACK: &str = "Image";

/// One fused image hit, ready for the response payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImageResult {
    pub path: String,
    pub caption: String,
    pub ocr: String,
    pub context: String,
    pub page: Option<u32>,
    pub document_id: String,
}

/// Query the image index for one document and resolve each hit.
///
/// Every lookup failure degrades to a default — an empty result list, a
/// fallback caption, empty page context — rather than aborting the image
/// or the remaining images.
pub async fn fuse_images(
    store: &dyn DocumentStore,
    query: &str,
    document_id: &str,
    limit: usize,
) -> Vec<ImageResult> {
    let bundle = match store.query_images_for_document(query, document_id, limit).await {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::warn!(document_id, "image query failed: {e}");
            return Vec::new();
        }
    };

    let mut results = Vec::new();
    for item in bundle.into_image_items() {
        let context = page_context(store, document_id, item.metadata.page).await;
        let caption = resolve_caption(&item);
        let owner = if item.metadata.document_id.is_empty() {
            document_id.to_owned()
        } else {
            item.metadata.document_id.clone()
        };
        results.push(ImageResult {
            path: item.metadata.path,
            caption,
            ocr: item.metadata.ocr,
            context,
            page: item.metadata.page,
            document_id: owner,
        });
    }
    results
}

/// Ordered fallback chain: stored caption, then the raw retrieved text,
/// then the literal fallback. First non-blank wins.
fn resolve_caption(item: &ImageItem) -> String {
    [
        item.metadata.caption.as_str(),
        item.text.as_str(),
        CAPTION_FALLBACK,
    ]
    .into_iter()
    .find(|candidate| !candidate.trim().is_empty())
    .unwrap_or(CAPTION_FALLBACK)
    .to_owned()
}

async fn page_context(store: &dyn DocumentStore, document_id: &str, page: Option<u32>) -> String {
    let Some(page) = page else {
        return String::new();
    };
    match store.text_for_page(document_id, page, 1).await {
        Ok(texts) => texts
            .first()
            .map(|t| truncate_chars(t, PAGE_CONTEXT_MAX_CHARS).to_owned())
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!(document_id, page, "page context lookup failed: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_memory::store::ImageMetadata;

    fn image_item(caption: &str, text: &str) -> ImageItem {
        ImageItem {
            text: text.to_owned(),
            metadata: ImageMetadata {
                caption: caption.to_owned(),
                ..ImageMetadata::default()
            },
        }
    }

    #[test]
    fn stored_caption_wins() {
        let item = image_item("a stored caption", "fig1");
        assert_eq!(resolve_caption(&item), "a stored caption");
    }

    #[test]
    fn retrieved_text_is_second_choice() {
        let item = image_item("", "fig1");
        assert_eq!(resolve_caption(&item), "fig1");
    }

    #[test]
    fn literal_fallback_is_last() {
        let item = image_item("", "  ");
        assert_eq!(resolve_caption(&item), "Image");
    }

    mod with_store {
        use super::*;
        use folio_memory::document::{Chunk, Difficulty, DiscourseType, ImageChunk};
        use folio_memory::store::InMemoryStore;

        fn chunk(id: &str, text: &str, page: Option<u32>) -> Chunk {
            Chunk {
                id: id.to_owned(),
                text: text.to_owned(),
                heading: String::new(),
                document_id: "doc1".to_owned(),
                page,
                discourse_type: DiscourseType::Unknown,
                difficulty: Difficulty::Unknown,
            }
        }

        fn image(id: &str, caption: &str, page: Option<u32>) -> ImageChunk {
            ImageChunk {
                id: id.to_owned(),
                caption: caption.to_owned(),
                ocr: "axis labels".to_owned(),
                page,
                document_id: "doc1".to_owned(),
                path: format!("img/{id}.png"),
            }
        }

        #[tokio::test]
        async fn page_context_resolved_and_truncated() {
            let store = InMemoryStore::new();
            let long_text = format!("page text {}", "y".repeat(500));
            store
                .upsert_chunks(vec![chunk("doc1_chunk_0", &long_text, Some(4))])
                .await
                .unwrap();
            store
                .upsert_images(vec![image("i1", "a scatter plot", Some(4))])
                .await
                .unwrap();

            let results = fuse_images(&store, "plot", "doc1", 5).await;
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].caption, "a scatter plot");
            assert!(results[0].context.starts_with("page text"));
            assert_eq!(results[0].context.chars().count(), PAGE_CONTEXT_MAX_CHARS);
        }

        #[tokio::test]
        async fn no_page_means_empty_context() {
            let store = InMemoryStore::new();
            store
                .upsert_images(vec![image("i1", "a chart", None)])
                .await
                .unwrap();

            let results = fuse_images(&store, "chart", "doc1", 5).await;
            assert_eq!(results.len(), 1);
            assert!(results[0].context.is_empty());
            assert_eq!(results[0].page, None);
        }

        #[tokio::test]
        async fn page_without_text_means_empty_context() {
            let store = InMemoryStore::new();
            store
                .upsert_images(vec![image("i1", "a chart", Some(9))])
                .await
                .unwrap();

            let results = fuse_images(&store, "chart", "doc1", 5).await;
            assert!(results[0].context.is_empty());
        }

        #[tokio::test]
        async fn document_scope_respected() {
            let store = InMemoryStore::new();
            store
                .upsert_images(vec![
                    image("i1", "in scope", None),
                    ImageChunk {
                        document_id: "other".to_owned(),
                        ..image("i2", "out of scope", None)
                    },
                ])
                .await
                .unwrap();

            let results = fuse_images(&store, "scope", "doc1", 5).await;
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].caption, "in scope");
            assert_eq!(results[0].document_id, "doc1");
        }
    }
}
