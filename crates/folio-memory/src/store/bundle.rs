//! Raw similarity results and their conversion to paired records.
//!
//! Stores return index-aligned `documents` / `metadatas` sequences. Pairing
//! happens here, immediately at the retrieval boundary, so no later stage
//! can misalign them. A missing or undecodable metadata position becomes the
//! default metadata, never a failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::types::{Difficulty, DiscourseType};

/// Raw, index-aligned result of one similarity query. Ephemeral.
#[derive(Debug, Clone, Default)]
pub struct RetrievalBundle {
    pub documents: Vec<String>,
    pub metadatas: Vec<HashMap<String, Value>>,
}

/// Decoded metadata of one retrieved text chunk. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub discourse_type: DiscourseType,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Decoded metadata of one retrieved image chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub ocr: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub document_id: String,
}

/// One retrieved text item, paired with its decoded metadata.
#[derive(Debug, Clone)]
pub struct RetrievedItem {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// One retrieved image item. `text` is the raw retrieved text for the hit.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub text: String,
    pub metadata: ImageMetadata,
}

fn decode<T: Default + for<'de> Deserialize<'de>>(map: HashMap<String, Value>) -> T {
    serde_json::from_value(Value::Object(map.into_iter().collect())).unwrap_or_default()
}

impl RetrievalBundle {
    /// Pair documents with text-chunk metadata positionally.
    #[must_use]
    pub fn into_items(self) -> Vec<RetrievedItem> {
        let mut metadatas = self.metadatas.into_iter();
        self.documents
            .into_iter()
            .map(|text| RetrievedItem {
                text,
                metadata: decode(metadatas.next().unwrap_or_default()),
            })
            .collect()
    }

    /// Pair documents with image-chunk metadata positionally.
    #[must_use]
    pub fn into_image_items(self) -> Vec<ImageItem> {
        let mut metadatas = self.metadatas.into_iter();
        self.documents
            .into_iter()
            .map(|text| ImageItem {
                text,
                metadata: decode(metadatas.next().unwrap_or_default()),
            })
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
