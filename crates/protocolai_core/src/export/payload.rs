//! Agent payload serializer.
//!
//! The output of [`serialize_document`] is the exact shape the agent service
//! expects; changing it breaks compatibility with that service.

use crate::model::document::Document;

const ELLIPSIS: &str = "...";

/// Serializes a document into the agent payload.
///
/// Layout: `TITLE: <title>`, one blank line, then one line per block with a
/// type-specific prefix (`# `, `## `, `> `, or none).
pub fn serialize_document(document: &Document) -> String {
    let body = document
        .blocks
        .iter()
        .map(|block| format!("{}{}", block.kind.payload_prefix(), block.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("TITLE: {}\n\n{}", document.title, body)
}

/// Truncates `value` to `max_chars` characters, appending `...` when cut.
pub fn snippet(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::{serialize_document, snippet};
    use crate::model::document::{Block, BlockType, Document};

    fn sample() -> Document {
        Document {
            id: "doc_sample".to_string(),
            emoji: String::new(),
            title: "Plan".to_string(),
            blocks: vec![
                Block::with_id("b1", BlockType::Heading1, "Goals"),
                Block::with_id("b2", BlockType::Heading2, "Week one"),
                Block::with_id("b3", BlockType::Quote, "Ship it"),
                Block::with_id("b4", BlockType::Text, "plain"),
                Block::with_id("b5", BlockType::Code, "let x = 1;"),
            ],
            updated_at: 0,
        }
    }

    #[test]
    fn serializes_prefixes_in_block_order() {
        assert_eq!(
            serialize_document(&sample()),
            "TITLE: Plan\n\n# Goals\n## Week one\n> Ship it\nplain\nlet x = 1;"
        );
    }

    #[test]
    fn empty_title_and_empty_block_keep_layout() {
        let doc = Document {
            id: "doc_blank".to_string(),
            emoji: String::new(),
            title: String::new(),
            blocks: vec![Block::with_id("b1", BlockType::Text, "")],
            updated_at: 0,
        };
        assert_eq!(serialize_document(&doc), "TITLE: \n\n");
    }

    #[test]
    fn serialization_is_deterministic() {
        let doc = sample();
        assert_eq!(serialize_document(&doc), serialize_document(&doc));
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        assert_eq!(snippet("héllo", 5), "héllo");
        assert_eq!(snippet("héllo world", 5), "héllo...");
    }
}
