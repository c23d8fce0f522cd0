use std::sync::Arc;

use super::chunker::chunk_sections;
use super::enrich::enrich_images;
use super::error::DocumentError;
use super::types::{ImageRecord, Section};
use crate::store::DocumentStore;
use folio_llm::provider::VisionProvider;

/// Counts reported back to the uploader.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    pub document_id: String,
    pub characters: usize,
    pub chunks: usize,
    pub images: usize,
}

/// Ingestion flow for one pre-parsed document: chunk sections into the text
/// index, enrich images into the image index.
pub struct IngestionPipeline<V: VisionProvider> {
    store: Arc<dyn DocumentStore>,
    vision: Arc<V>,
}

impl<V: VisionProvider> IngestionPipeline<V> {
    pub fn new(store: Arc<dyn DocumentStore>, vision: Arc<V>) -> Self {
        Self { store, vision }
    }

    /// Ingest one document. Sections and images get the document id threaded
    /// through before anything is derived from them.
    ///
    /// # Errors
    ///
    /// Returns an error if either index write fails. Per-image enrichment
    /// failures are substituted, not propagated.
    pub async fn ingest(
        &self,
        document_id: &str,
        text: &str,
        mut sections: Vec<Section>,
        mut images: Vec<ImageRecord>,
    ) -> Result<IngestReport, DocumentError> {
        for section in &mut sections {
            section.document_id = document_id.to_owned();
        }
        for image in &mut images {
            image.document_id = document_id.to_owned();
        }

        let chunks = chunk_sections(&sections, document_id);
        let chunk_count = chunks.len();
        if !chunks.is_empty() {
            self.store.upsert_chunks(chunks).await?;
        }

        let image_chunks = enrich_images(self.vision.as_ref(), &images).await;
        let image_count = image_chunks.len();
        if !image_chunks.is_empty() {
            self.store.upsert_images(image_chunks).await?;
        }

        tracing::info!(
            document_id,
            chunks = chunk_count,
            images = image_count,
            "document ingested"
        );

        Ok(IngestReport {
            document_id: document_id.to_owned(),
            characters: text.chars().count(),
            chunks: chunk_count,
            images: image_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{Difficulty, DiscourseType};
    use crate::store::InMemoryStore;
    use folio_llm::mock::MockVision;

    fn section(content: &str) -> Section {
        Section {
            heading: "H".to_owned(),
            content: content.to_owned(),
            page: Some(1),
            discourse_type: DiscourseType::Unknown,
            difficulty: Difficulty::Unknown,
            document_id: String::new(),
        }
    }

    fn pipeline() -> (Arc<InMemoryStore>, IngestionPipeline<MockVision>) {
        let store = Arc::new(InMemoryStore::new());
        let p = IngestionPipeline::new(store.clone(), Arc::new(MockVision));
        (store, p)
    }

    #[tokio::test]
    async fn report_counts_chunks_and_characters() {
        let (_store, pipeline) = pipeline();
        let text = "full document text";
        let sections = vec![section(
            "A sentence long enough to survive the noise floor filter.",
        )];

        let report = pipeline
            .ingest("doc1", text, sections, Vec::new())
            .await
            .unwrap();
        assert_eq!(report.document_id, "doc1");
        assert_eq!(report.characters, text.chars().count());
        assert_eq!(report.chunks, 1);
        assert_eq!(report.images, 0);
    }

    #[tokio::test]
    async fn chunks_land_in_store_with_document_id() {
        let (store, pipeline) = pipeline();
        let sections = vec![section(
            "A sentence long enough to survive the noise floor filter.",
        )];

        pipeline
            .ingest("doc1", "t", sections, Vec::new())
            .await
            .unwrap();

        let items = store
            .query_similar("sentence noise floor", 5)
            .await
            .unwrap()
            .into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].metadata.document_id, "doc1");
    }

    #[tokio::test]
    async fn all_short_sections_store_nothing() {
        let (store, pipeline) = pipeline();
        let sections = vec![section("Too short. Tiny.")];

        let report = pipeline
            .ingest("doc1", "t", sections, Vec::new())
            .await
            .unwrap();
        assert_eq!(report.chunks, 0);
        assert!(store.query_similar("short", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_images_still_counted_and_stored() {
        let (store, pipeline) = pipeline();
        let images = vec![ImageRecord {
            id: "img1".to_owned(),
            path: "/nonexistent.png".to_owned(),
            page: Some(2),
            document_id: String::new(),
        }];

        let report = pipeline
            .ingest("doc1", "t", Vec::new(), images)
            .await
            .unwrap();
        assert_eq!(report.images, 1);

        let items = store
            .query_images_for_document("anything", "doc1", 5)
            .await
            .unwrap()
            .into_image_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].metadata.caption, "Image");
    }
}
