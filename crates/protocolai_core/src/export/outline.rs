//! Sidebar projections: table of contents, hints and display titles.

use crate::model::document::{BlockId, BlockType, Document};

const UNTITLED: &str = "Untitled";
const UNTITLED_SECTION: &str = "Untitled Section";
const EMPTY_HINT: &str = "Empty";

/// One heading entry in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Target block, used as scroll anchor.
    pub block_id: BlockId,
    /// `Heading1` or `Heading2`.
    pub level: BlockType,
    /// Heading text, `Untitled Section` when blank.
    pub label: String,
}

/// Extracts headings in block order.
pub fn table_of_contents(document: &Document) -> Vec<OutlineEntry> {
    document
        .blocks
        .iter()
        .filter(|block| block.kind.is_heading())
        .map(|block| OutlineEntry {
            block_id: block.id.clone(),
            level: block.kind,
            label: if block.content.is_empty() {
                UNTITLED_SECTION.to_string()
            } else {
                block.content.clone()
            },
        })
        .collect()
}

/// Returns the first non-blank block content, or `Empty`.
pub fn sidebar_hint(document: &Document) -> &str {
    document
        .blocks
        .iter()
        .find(|block| !block.content.trim().is_empty())
        .map_or(EMPTY_HINT, |block| block.content.as_str())
}

/// Returns the title, or `Untitled` when blank.
pub fn display_title(document: &Document) -> &str {
    if document.title.is_empty() {
        UNTITLED
    } else {
        document.title.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::{display_title, sidebar_hint, table_of_contents};
    use crate::model::document::{Block, BlockType, Document};
    use crate::model::seed::initial_documents;

    #[test]
    fn toc_lists_headings_in_order() {
        let doc = &initial_documents(0)[0];
        let toc = table_of_contents(doc);
        let ids: Vec<&str> = toc.iter().map(|entry| entry.block_id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b3", "b6", "b10", "b11", "b13"]);
        assert_eq!(toc[0].level, BlockType::Heading1);
        assert_eq!(toc[1].label, "1. Block Management");
    }

    #[test]
    fn blank_document_projections_fall_back() {
        let doc = Document {
            id: "doc_blank".to_string(),
            emoji: String::new(),
            title: String::new(),
            blocks: vec![
                Block::with_id("b1", BlockType::Text, "   "),
                Block::with_id("b2", BlockType::Heading2, ""),
            ],
            updated_at: 0,
        };
        assert_eq!(display_title(&doc), "Untitled");
        assert_eq!(sidebar_hint(&doc), "Empty");
        assert_eq!(table_of_contents(&doc)[0].label, "Untitled Section");
    }
}
