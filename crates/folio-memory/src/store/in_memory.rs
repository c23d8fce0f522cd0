//! In-process store backend for tests and single-node development.
//!
//! Similarity is token overlap between the lowercased query and the stored
//! text. Ties and ordering are made deterministic by sorting on
//! (score desc, id asc).

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Value, json};

use super::{BoxFuture, DocumentStore, RetrievalBundle, StoreError};
use crate::document::types::{Chunk, ImageChunk};

#[derive(Default)]
struct Indexes {
    chunks: HashMap<String, Chunk>,
    images: HashMap<String, ImageChunk>,
}

pub struct InMemoryStore {
    indexes: RwLock<Indexes>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(Indexes::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

fn overlap_score(query_tokens: &[String], text: &str) -> usize {
    let text = text.to_lowercase();
    query_tokens
        .iter()
        .filter(|t| text.contains(t.as_str()))
        .count()
}

fn query_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

fn chunk_payload(chunk: &Chunk) -> HashMap<String, Value> {
    let value = json!({
        "heading": chunk.heading,
        "document_id": chunk.document_id,
        "page": chunk.page,
        "discourse_type": chunk.discourse_type,
        "difficulty": chunk.difficulty,
    });
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

fn image_payload(image: &ImageChunk) -> HashMap<String, Value> {
    let value = json!({
        "caption": image.caption,
        "ocr": image.ocr,
        "path": image.path,
        "page": image.page,
        "document_id": image.document_id,
    });
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

impl DocumentStore for InMemoryStore {
    fn query_similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>> {
        let tokens = query_tokens(query);
        Box::pin(async move {
            let indexes = self.indexes.read().map_err(|_| StoreError::Poisoned)?;

            let mut scored: Vec<(&Chunk, usize)> = indexes
                .chunks
                .values()
                .map(|c| {
                    let haystack = format!("{} {}", c.heading, c.text);
                    (c, overlap_score(&tokens, &haystack))
                })
                .collect();
            scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));

            let mut bundle = RetrievalBundle::default();
            for (chunk, _) in scored.into_iter().take(top_k) {
                bundle.documents.push(chunk.text.clone());
                bundle.metadatas.push(chunk_payload(chunk));
            }
            Ok(bundle)
        })
    }

    fn query_images_for_document(
        &self,
        query: &str,
        document_id: &str,
        limit: usize,
    ) -> BoxFuture<'_, Result<RetrievalBundle, StoreError>> {
        let tokens = query_tokens(query);
        let document_id = document_id.to_owned();
        Box::pin(async move {
            let indexes = self.indexes.read().map_err(|_| StoreError::Poisoned)?;

            let mut scored: Vec<(&ImageChunk, usize)> = indexes
                .images
                .values()
                .filter(|i| i.document_id == document_id)
                .map(|i| {
                    let haystack = format!("{} {}", i.caption, i.ocr);
                    (i, overlap_score(&tokens, &haystack))
                })
                .collect();
            scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));

            let mut bundle = RetrievalBundle::default();
            for (image, _) in scored.into_iter().take(limit) {
                bundle.documents.push(image.caption.clone());
                bundle.metadatas.push(image_payload(image));
            }
            Ok(bundle)
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
            let indexes = self.indexes.read().map_err(|_| StoreError::Poisoned)?;

            let mut matching: Vec<&Chunk> = indexes
                .chunks
                .values()
                .filter(|c| c.document_id == document_id && c.page == Some(page))
                .collect();
            matching.sort_by(|a, b| a.id.cmp(&b.id));

            Ok(matching
                .into_iter()
                .take(limit)
                .map(|c| c.text.clone())
                .collect())
        })
    }

    fn upsert_chunks(&self, chunks: Vec<Chunk>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut indexes = self.indexes.write().map_err(|_| StoreError::Poisoned)?;
            for chunk in chunks {
                indexes.chunks.insert(chunk.id.clone(), chunk);
            }
            Ok(())
        })
    }

    fn upsert_images(&self, images: Vec<ImageChunk>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut indexes = self.indexes.write().map_err(|_| StoreError::Poisoned)?;
            for image in images {
                indexes.images.insert(image.id.clone(), image);
            }
            Ok(())
        })
    }
}
