//! Qdrant-backed text and image indexes.
//!
//! Point ids are UUIDv5 digests of the chunk id, so re-ingesting a document
//! overwrites its points instead of duplicating them.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    Filter, PointStruct, ScoredPoint, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use serde_json::{Value, json};

use super::{BoxFuture, DocumentStore, RetrievalBundle, StoreError};
use crate::document::types::{Chunk, ImageChunk};
use folio_llm::provider::EmbedFuture;

const TEXT_COLLECTION: &str = "folio_text_chunks";
const IMAGE_COLLECTION: &str = "folio_image_chunks";

/// Embedder handed in as a closure so the store stays provider-agnostic.
pub type EmbedFn = Box<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

pub struct QdrantStore {
    qdrant: Qdrant,
    text_collection: String,
    image_collection: String,
    embed: EmbedFn,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore")
            .field("text_collection", &self.text_collection)
            .field("image_collection", &self.image_collection)
            .finish_non_exhaustive()
    }
}

fn point_id(chunk_id: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn payload_to_map(payload: &HashMap<String, qdrant_client::qdrant::Value>) -> HashMap<String, Value> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let json = if let Some(text) = value.as_str() {
                json!(text)
            } else if let Some(int) = value.as_integer() {
                json!(int)
            } else if let Some(float) = value.as_double() {
                json!(float)
            } else if let Some(flag) = value.as_bool() {
                json!(flag)
            } else {
                return None;
            };
            Some((key.clone(), json))
        })
        .collect()
}

fn bundle_from_points(points: Vec<ScoredPoint>, text_field: &str) -> RetrievalBundle {
    let mut bundle = RetrievalBundle::default();
    for point in points {
        let Some(text) = point.payload.get(text_field).and_then(|v| v.as_str()) else {
            continue;
        };
        bundle.documents.push(text.to_owned());
        bundle.metadatas.push(payload_to_map(&point.payload));
    }
    bundle
}

impl QdrantStore {
    /// # Errors
    ///
    /// Returns an error if the Qdrant client fails to connect.
    pub fn new(url: &str, embed: EmbedFn) -> Result<Self, StoreError> {
        let qdrant = Qdrant::from_url(url).build().map_err(Box::new)?;
        Ok(Self {
            qdrant,
            text_collection: TEXT_COLLECTION.into(),
            image_collection: IMAGE_COLLECTION.into(),
            embed,
        })
    }

    /// Create both collections and their payload indexes if absent.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached or creation fails.
    pub async fn ensure_collections(&self, vector_size: u64) -> Result<(), StoreError> {
        for collection in [&self.text_collection, &self.image_collection] {
            if self
                .qdrant
                .collection_exists(collection)
                .await
                .map_err(Box::new)?
            {
                continue;
            }
            self.qdrant
                .create_collection(
                    CreateCollectionBuilder::new(collection)
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(Box::new)?;
            self.qdrant
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    collection,
                    "document_id",
                    FieldType::Keyword,
                ))
                .await
                .map_err(Box::new)?;
        }

        self.qdrant
            .create_field_index(CreateFieldIndexCollectionBuilder::new(
                &self.text_collection,
                "page",
                FieldType::Integer,
            ))
            .await
            .map_err(Box::new)?;

        Ok(())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        Ok((self.embed)(text).await?)
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
        filter: Option<Filter>,
    ) -> Result<Vec<ScoredPoint>, StoreError> {
        let mut builder =
            SearchPointsBuilder::new(collection, vector, limit as u64).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        let results = self.qdrant.search_points(builder).await.map_err(Box::new)?;
        Ok(results.result)
    }

    fn chunk_point(chunk: &Chunk, vector: Vec<f32>) -> Result<PointStruct, StoreError> {
        let payload: HashMap<String, qdrant_client::qdrant::Value> =
            serde_json::from_value(json!({
                "text": chunk.text,
                "heading": chunk.heading,
                "document_id": chunk.document_id,
                "page": chunk.page,
                "discourse_type": chunk.discourse_type,
                "difficulty": chunk.difficulty,
            }))?;
        Ok(PointStruct::new(point_id(&chunk.id), vector, payload))
    }

    fn image_point(image: &ImageChunk, vector: Vec<f32>) -> Result<PointStruct, StoreError> {
        let payload: HashMap<String, qdrant_client::qdrant::Value> =
            serde_json::from_value(json!({
                "caption": image.caption,
                "ocr": image.ocr,
                "path": image.path,
                "document_id": image.document_id,
                "page": image.page,
            }))?;
        Ok(PointStruct::new(point_id(&image.id), vector, payload))
    }
}

impl DocumentStore for QdrantStore {
    fn query_similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>> {
        let query = query.to_owned();
        Box::pin(async move {
            let vector = self.embed_query(&query).await?;
            let points = self.search(&self.text_collection, vector, top_k, None).await?;
            Ok(bundle_from_points(points, "text"))
        })
    }

    fn query_images_for_document(
        &self,
        query: &str,
        document_id: &str,
        limit: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>> {
        let query = query.to_owned();
        let document_id = document_id.to_owned();
        Box::pin(async move {
            let vector = self.embed_query(&query).await?;
            let filter = Filter::must(vec![Condition::matches("document_id", document_id)]);
            let points = self
                .search(&self.image_collection, vector, limit, Some(filter))
                .await?;
            Ok(bundle_from_points(points, "caption"))
        })
    }

    fn text_for_page(
        &self,
        document_id: &str,
        page: u32,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        let document_id = document_id.to_owned();
        Box::pin(async move {
            let filter = Filter::must(vec![
                Condition::matches("document_id", document_id),
                Condition::matches("page", i64::from(page)),
            ]);
            let results = self
                .qdrant
                .scroll(
                    ScrollPointsBuilder::new(&self.text_collection)
                        .filter(filter)
                        .limit(u32::try_from(limit).unwrap_or(u32::MAX))
                        .with_payload(true),
                )
                .await
                .map_err(Box::new)?;
            Ok(results
                .result
                .into_iter()
                .filter_map(|p| p.payload.get("text").and_then(|v| v.as_str()).map(ToOwned::to_owned))
                .collect())
        })
    }

    fn upsert_chunks(&self, chunks: Vec<Chunk>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if chunks.is_empty() {
                return Ok(());
            }
            let mut points = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let vector = (self.embed)(&chunk.text).await?;
                points.push(Self::chunk_point(chunk, vector)?);
            }
            self.qdrant
                .upsert_points(UpsertPointsBuilder::new(&self.text_collection, points))
                .await
                .map_err(Box::new)?;
            Ok(())
        })
    }

    fn upsert_images(&self, images: Vec<ImageChunk>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if images.is_empty() {
                return Ok(());
            }
            let mut points = Vec::with_capacity(images.len());
            for image in &images {
                let vector = (self.embed)(&image.caption).await?;
                points.push(Self::image_point(image, vector)?);
            }
            self.qdrant
                .upsert_points(UpsertPointsBuilder::new(&self.image_collection, points))
                .await
                .map_err(Box::new)?;
            Ok(())
        })
    }
}
