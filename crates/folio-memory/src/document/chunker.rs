//! Section-to-chunk splitting with a noise floor.

use super::types::{Chunk, Section};

/// Trimmed units shorter than this carry too little signal to retrieve.
pub const MIN_CHUNK_CHARS: usize = 30;

/// Split classified sections into retrievable chunks.
///
/// Pure: identical input yields identical output. Units are split at
/// sentence-boundary punctuation, never overlap, and never merge across
/// sections. Survivors inherit their section's heading, page, and
/// classification labels; ids run `{document_id}_chunk_0..n` in emission
/// order across the whole call.
#[must_use]
pub fn chunk_sections(sections: &[Section], document_id: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut next_id = 0usize;

    for section in sections {
        for unit in split_sentence_units(&section.content) {
            let text = unit.trim();
            if text.chars().count() < MIN_CHUNK_CHARS {
                continue;
            }
            chunks.push(Chunk {
                id: format!("{document_id}_chunk_{next_id}"),
                text: text.to_owned(),
                heading: section.heading.clone(),
                document_id: document_id.to_owned(),
                page: section.page,
                discourse_type: section.discourse_type,
                difficulty: section.difficulty,
            });
            next_id += 1;
        }
    }

    chunks
}

/// Split at `.`, `?`, or `!` followed by whitespace. The terminator stays
/// with the unit it closes.
fn split_sentence_units(content: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut prev_was_terminator = false;

    for (idx, ch) in content.char_indices() {
        if prev_was_terminator && ch.is_whitespace() {
            units.push(&content[start..idx]);
            start = idx;
        }
        prev_was_terminator = matches!(ch, '.' | '?' | '!');
    }

    if start < content.len() {
        units.push(&content[start..]);
    }
    units
}
