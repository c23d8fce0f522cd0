//! Query orchestration: retrieve, assemble, generate, fuse.

use std::sync::Arc;

use folio_llm::LlmProvider;
use folio_memory::document::Section;
use folio_memory::store::DocumentStore;
use serde::Serialize;

use crate::assembler::{self, DEFAULT_MAX_ITEMS, render_block};
use crate::error::Result;
use crate::fusion::{ImageResult, fuse_images};
use crate::prompt;

/// Fixed answer returned when retrieval produces no usable context.
/// Generation is never called in that case.
pub const NO_CONTEXT_ANSWER: &str =
    "Not found in the provided notes. Try rephrasing or upload more pages.";

/// Substituted answer when the generation call itself fails.
const GENERATION_UNAVAILABLE: &str =
    "Answer generation is currently unavailable. Please try again.";

#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Candidates fetched from the text index per query.
    pub top_k: usize,
    /// Context blocks kept after reordering.
    pub max_items: usize,
    /// Image hits fetched for the answer's document.
    pub image_limit: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 12,
            max_items: DEFAULT_MAX_ITEMS,
            image_limit: 4,
        }
    }
}

/// Full response to one grounded query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    /// The citation-labeled context blocks the answer was grounded in.
    pub context: Vec<String>,
    pub images: Vec<ImageResult>,
}

/// Summary of one section, keyed by its heading.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub heading: String,
    pub summary: String,
}

pub struct RagEngine<P> {
    llm: Arc<P>,
    store: Arc<dyn DocumentStore>,
    config: RagConfig,
}

impl<P> std::fmt::Debug for RagEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider> RagEngine<P> {
    pub fn new(llm: Arc<P>, store: Arc<dyn DocumentStore>, config: RagConfig) -> Self {
        Self { llm, store, config }
    }

    /// Answer a query from the indexed documents.
    ///
    /// Zero retrieval hits short-circuit to the sentinel answer without
    /// touching the generator. Image fusion is scoped to the document of
    /// the top-ranked text hit.
    ///
    /// # Errors
    ///
    /// Returns an error only when the text similarity query itself fails;
    /// generation and image failures degrade inside the response.
    pub async fn answer(&self, query: &str) -> Result<QueryResponse> {
        let bundle = self.store.query_similar(query, self.config.top_k).await?;
        let items = bundle.into_items();
        let blocks = assembler::assemble(query, items, self.config.max_items);

        if blocks.is_empty() {
            tracing::info!(query, "no retrieval hits, returning sentinel");
            return Ok(QueryResponse {
                answer: NO_CONTEXT_ANSWER.to_owned(),
                context: Vec::new(),
                images: Vec::new(),
            });
        }

        let answer_prompt = prompt::build_answer_prompt(query, &blocks);
        let answer = self.generate_or_placeholder(&answer_prompt).await;

        let top_document = blocks[0].metadata.document_id.clone();
        let images = if top_document.is_empty() {
            Vec::new()
        } else {
            fuse_images(
                self.store.as_ref(),
                query,
                &top_document,
                self.config.image_limit,
            )
            .await
        };

        tracing::info!(
            query,
            blocks = blocks.len(),
            images = images.len(),
            "answered query"
        );
        Ok(QueryResponse {
            answer,
            context: blocks.iter().map(render_block).collect(),
            images,
        })
    }

    /// Generate flashcard-style study notes for raw text.
    pub async fn quick_notes(&self, text: &str) -> String {
        self.generate_or_placeholder(&prompt::build_notes_prompt(text))
            .await
    }

    /// Generate a three-level summary of raw text.
    pub async fn summarize(&self, text: &str) -> String {
        self.generate_or_placeholder(&prompt::build_summary_prompt(text))
            .await
    }

    /// Summarize each section independently. One failed generation only
    /// degrades that section's summary.
    pub async fn summarize_sections(&self, sections: &[Section]) -> Vec<SectionSummary> {
        let mut summaries = Vec::with_capacity(sections.len());
        for section in sections {
            let summary = self
                .generate_or_placeholder(&prompt::build_section_prompt(&section.content))
                .await;
            summaries.push(SectionSummary {
                heading: section.heading.clone(),
                summary,
            });
        }
        summaries
    }

    async fn generate_or_placeholder(&self, prompt: &str) -> String {
        match self.llm.generate(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(provider = self.llm.name(), "generation failed: {e}");
                GENERATION_UNAVAILABLE.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_llm::mock::MockLlm;
    use folio_memory::document::{Chunk, Difficulty, DiscourseType, ImageChunk};
    use folio_memory::store::InMemoryStore;

    fn chunk(id: &str, text: &str, discourse: DiscourseType) -> Chunk {
        Chunk {
            id: id.to_owned(),
            text: text.to_owned(),
            heading: "Cells".to_owned(),
            document_id: "doc1".to_owned(),
            page: Some(1),
            discourse_type: discourse,
            difficulty: Difficulty::Unknown,
        }
    }

    async fn engine_with_chunks(chunks: Vec<Chunk>, llm: MockLlm) -> RagEngine<MockLlm> {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_chunks(chunks).await.unwrap();
        RagEngine::new(Arc::new(llm), store, RagConfig::default())
    }

    #[tokio::test]
    async fn empty_retrieval_returns_sentinel_without_generating() {
        let llm = MockLlm::default();
        let engine = engine_with_chunks(Vec::new(), llm.clone()).await;

        let response = engine.answer("anything at all").await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.context.is_empty());
        assert!(response.images.is_empty());
        assert_eq!(llm.generate_calls(), 0);
    }

    #[tokio::test]
    async fn answer_grounds_prompt_in_retrieved_context() {
        let llm = MockLlm::with_responses(vec!["cells divide [1]".into()]);
        let engine = engine_with_chunks(
            vec![chunk(
                "doc1_chunk_0",
                "cells divide through a process called mitosis",
                DiscourseType::Explanation,
            )],
            llm.clone(),
        )
        .await;

        let response = engine.answer("how do cells divide?").await.unwrap();
        assert_eq!(response.answer, "cells divide [1]");
        assert_eq!(response.context.len(), 1);
        assert!(response.context[0].starts_with("[1] (page 1, Cells,"));

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("mitosis"));
        assert!(prompts[0].contains("how do cells divide?"));
    }

    #[tokio::test]
    async fn generation_failure_substitutes_placeholder() {
        let engine = engine_with_chunks(
            vec![chunk(
                "doc1_chunk_0",
                "cells divide through a process called mitosis",
                DiscourseType::Explanation,
            )],
            MockLlm::failing(),
        )
        .await;

        let response = engine.answer("how do cells divide?").await.unwrap();
        assert_eq!(response.answer, GENERATION_UNAVAILABLE);
        assert_eq!(response.context.len(), 1);
    }

    #[tokio::test]
    async fn images_fused_from_top_hit_document() {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert_chunks(vec![chunk(
                "doc1_chunk_0",
                "the mitosis diagram shows four phases",
                DiscourseType::Explanation,
            )])
            .await
            .unwrap();
        store
            .upsert_images(vec![
                ImageChunk {
                    id: "doc1_img_0".to_owned(),
                    caption: "mitosis phases diagram".to_owned(),
                    ocr: String::new(),
                    page: Some(1),
                    document_id: "doc1".to_owned(),
                    path: "img/mitosis.png".to_owned(),
                },
                ImageChunk {
                    id: "doc2_img_0".to_owned(),
                    caption: "unrelated mitosis chart".to_owned(),
                    ocr: String::new(),
                    page: None,
                    document_id: "doc2".to_owned(),
                    path: "img/other.png".to_owned(),
                },
            ])
            .await
            .unwrap();
        let engine = RagEngine::new(
            Arc::new(MockLlm::default()),
            store,
            RagConfig::default(),
        );

        let response = engine.answer("mitosis diagram").await.unwrap();
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].document_id, "doc1");
        assert_eq!(response.images[0].caption, "mitosis phases diagram");
    }

    #[tokio::test]
    async fn definition_hit_cited_first() {
        let llm = MockLlm::default();
        let engine = engine_with_chunks(
            vec![
                chunk(
                    "doc1_chunk_0",
                    "mitosis happens in somatic cells all the time",
                    DiscourseType::Example,
                ),
                chunk(
                    "doc1_chunk_1",
                    "mitosis is the division of a cell into two identical cells",
                    DiscourseType::Definition,
                ),
            ],
            llm.clone(),
        )
        .await;

        let response = engine.answer("definition of mitosis").await.unwrap();
        assert!(response.context[0].contains("division of a cell"));
        let prompts = llm.prompts();
        let definition = prompts[0].find("division of a cell").unwrap();
        let example = prompts[0].find("somatic cells").unwrap();
        assert!(definition < example);
    }

    #[tokio::test]
    async fn section_summaries_isolate_failures() {
        let engine = engine_with_chunks(Vec::new(), MockLlm::failing()).await;
        let section = |heading: &str, content: &str| Section {
            heading: heading.to_owned(),
            content: content.to_owned(),
            page: None,
            discourse_type: DiscourseType::Unknown,
            difficulty: Difficulty::Unknown,
            document_id: String::new(),
        };
        let sections = vec![
            section("One", "first section body"),
            section("Two", "second section body"),
        ];

        let summaries = engine.summarize_sections(&sections).await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].heading, "One");
        assert_eq!(summaries[0].summary, GENERATION_UNAVAILABLE);
        assert_eq!(summaries[1].summary, GENERATION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn notes_and_summary_use_their_templates() {
        let llm = MockLlm::default();
        let engine = engine_with_chunks(Vec::new(), llm.clone()).await;

        engine.quick_notes("some study text").await;
        engine.summarize("some study text").await;

        let prompts = llm.prompts();
        assert!(prompts[0].contains("5 flashcards"));
        assert!(prompts[1].contains("TL;DR"));
    }
}
