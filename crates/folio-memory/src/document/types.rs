use serde::{Deserialize, Serialize};

/// Classification label biasing retrieval order. Unknown values collapse to
/// [`DiscourseType::Unknown`] rather than failing deserialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscourseType {
    Definition,
    Example,
    Explanation,
    Procedure,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DiscourseType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Example => "example",
            Self::Explanation => "explanation",
            Self::Procedure => "procedure",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DiscourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified document section as produced upstream.
///
/// `content` is required: a payload missing it is rejected at the
/// deserialization boundary, before any chunking runs. `document_id` is
/// assigned by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub heading: String,
    pub content: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub discourse_type: DiscourseType,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub document_id: String,
}

/// A stored, retrievable text unit derived from one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub heading: String,
    pub document_id: String,
    pub page: Option<u32>,
    pub discourse_type: DiscourseType,
    pub difficulty: Difficulty,
}

/// An extracted image awaiting enrichment. Produced upstream; `document_id`
/// is assigned by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub document_id: String,
}

/// An enriched image ready for the image index. Built once at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageChunk {
    pub id: String,
    pub caption: String,
    pub ocr: String,
    pub page: Option<u32>,
    pub document_id: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_discourse_value_collapses() {
        let parsed: DiscourseType = serde_json::from_str("\"rhetorical\"").unwrap();
        assert_eq!(parsed, DiscourseType::Unknown);
    }

    #[test]
    fn known_discourse_value_parses() {
        let parsed: DiscourseType = serde_json::from_str("\"definition\"").unwrap();
        assert_eq!(parsed, DiscourseType::Definition);
    }

    #[test]
    fn section_without_content_rejected() {
        let result: Result<Section, _> =
            serde_json::from_str(r#"{"heading": "Intro", "page": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn section_defaults_applied() {
        let section: Section = serde_json::from_str(r#"{"content": "body text"}"#).unwrap();
        assert!(section.heading.is_empty());
        assert_eq!(section.page, None);
        assert_eq!(section.discourse_type, DiscourseType::Unknown);
        assert_eq!(section.difficulty, Difficulty::Unknown);
    }
}
