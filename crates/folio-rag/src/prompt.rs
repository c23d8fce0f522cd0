//! Prompt construction for the external generator.
//!
//! The prompts are fixed templates. Only the contract matters here: what
//! context is included, the refusal phrase, the citation convention, and
//! the input caps.

use folio_memory::text::truncate_chars;

use crate::assembler::{ContextBlock, render_block};

/// Phrase the generator must answer with when the context does not
/// support the question.
pub const REFUSAL: &str = "Not found in the provided notes.";

/// Input cap for the quick-notes and multi-level summary templates.
pub const NOTES_INPUT_MAX_CHARS: usize = 4000;
pub const SUMMARY_INPUT_MAX_CHARS: usize = 4000;
/// Input cap for a single section summary.
pub const SECTION_INPUT_MAX_CHARS: usize = 2000;

/// Build the grounded-answer prompt from ranked context blocks.
#[must_use]
pub fn build_answer_prompt(query: &str, blocks: &[ContextBlock]) -> String {
    let mut context = String::new();
    for block in blocks {
        context.push_str(&render_block(block));
        context.push_str("\n\n");
    }
    format!(
        "Answer the question using only the context below. \
         If the context does not contain the answer, respond exactly with \
         \"{REFUSAL}\" \
         Cite the sources you used with their bracket numbers, like [1].\n\n\
         Context:\n{context}Question: {query}"
    )
}

#[must_use]
pub fn build_notes_prompt(text: &str) -> String {
    let text = truncate_chars(text, NOTES_INPUT_MAX_CHARS);
    format!(
        "Create quick study notes from the text:\n\
         1) 5 flashcards (Q/A)\n\
         2) One-page cheat sheet\n\
         3) 5 MCQs with answers\n\
         4) 5 interview questions\n\n\
         Text:\n{text}"
    )
}

#[must_use]
pub fn build_summary_prompt(text: &str) -> String {
    let text = truncate_chars(text, SUMMARY_INPUT_MAX_CHARS);
    format!(
        "Summarize the text at three levels:\n\
         1) TL;DR (1-2 sentences)\n\
         2) Concept summary (3-5 bullets)\n\
         3) Beginner-friendly (short paragraph)\n\n\
         Text:\n{text}"
    )
}

#[must_use]
pub fn build_section_prompt(content: &str) -> String {
    let content = truncate_chars(content, SECTION_INPUT_MAX_CHARS);
    format!("Summarize this section in 2-3 sentences.\n\n{content}")
}
