//! Primary ranking: intent-aware reorder, truncation, citation labels.

use folio_memory::document::DiscourseType;
use folio_memory::store::{ChunkMetadata, RetrievedItem};

/// Default cap on context blocks per answer.
pub const DEFAULT_MAX_ITEMS: usize = 8;

/// One ranked, citation-labeled unit of context. `rank` is 1-based and
/// matches the block's final position after truncation.
#[derive(Debug, Clone)]
pub struct ContextBlock {
    pub rank: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Turn paired retrieval items into at most `max_items` citation-ranked
/// context blocks.
///
/// When the lowercased query contains "define" or "definition", items
/// classified as definitions move ahead of everything else. The partition
/// is stable: within each group the upstream similarity order is kept,
/// since retrieval already sorted by relevance.
#[must_use]
pub fn assemble(query: &str, items: Vec<RetrievedItem>, max_items: usize) -> Vec<ContextBlock> {
    let ordered = if wants_definitions(query) {
        let (definitions, rest): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.metadata.discourse_type == DiscourseType::Definition);
        definitions.into_iter().chain(rest).collect()
    } else {
        items
    };

    ordered
        .into_iter()
        .take(max_items)
        .enumerate()
        .map(|(i, item)| ContextBlock {
            rank: i + 1,
            text: item.text,
            metadata: item.metadata,
        })
        .collect()
}

fn wants_definitions(query: &str) -> bool {
    let query = query.to_lowercase();
    query.contains("define") || query.contains("definition")
}

/// Render one block as its labeled citation line plus text.
#[must_use]
pub fn render_block(block: &ContextBlock) -> String {
    let page = block
        .metadata
        .page
        .map_or_else(|| "?".to_owned(), |p| p.to_string());
    let heading = if block.metadata.heading.is_empty() {
        "Source"
    } else {
        &block.metadata.heading
    };
    format!(
        "[{}] (page {page}, {heading}, {})\n{}",
        block.rank, block.metadata.discourse_type, block.text
    )
}
