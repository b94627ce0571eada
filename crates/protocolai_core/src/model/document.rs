//! Document and block domain model.
//!
//! # Responsibility
//! - Define the canonical document/block records shared by store, serializer
//!   and persistence.
//! - Keep the persisted JSON shape compatible with existing saved data.
//!
//! # Invariants
//! - `Document::id` is stable for the lifetime of the document.
//! - A document always owns at least one block.
//! - `blocks` order is reading order.

use crate::id;
use serde::{Deserialize, Serialize};

/// Stable document identifier (`doc_...`).
pub type DocumentId = String;

/// Stable block identifier, unique within its document.
pub type BlockId = String;

/// Content category of one block.
///
/// Serialized with the short tags used by stored data (`h1`, `blockquote`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    /// Plain paragraph.
    #[serde(rename = "text")]
    Text,
    /// Top-level heading.
    #[serde(rename = "h1")]
    Heading1,
    /// Second-level heading.
    #[serde(rename = "h2")]
    Heading2,
    /// Block quote.
    #[serde(rename = "blockquote")]
    Quote,
    /// Preformatted code.
    #[serde(rename = "code")]
    Code,
}

impl BlockType {
    /// Returns whether this block contributes to the table of contents.
    pub fn is_heading(self) -> bool {
        matches!(self, Self::Heading1 | Self::Heading2)
    }

    /// Markdown-like line prefix used by the agent payload.
    pub fn payload_prefix(self) -> &'static str {
        match self {
            Self::Heading1 => "# ",
            Self::Heading2 => "## ",
            Self::Quote => "> ",
            Self::Text | Self::Code => "",
        }
    }
}

/// One atomic, typed unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Serialized as `type` to match the stored schema.
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: String,
}

impl Block {
    /// Creates a block with a generated id.
    pub fn new(kind: BlockType, content: impl Into<String>) -> Self {
        Self::with_id(id::short_id(), kind, content)
    }

    /// Creates an empty text block with a generated id.
    pub fn empty_text() -> Self {
        Self::new(BlockType::Text, "")
    }

    /// Creates a block with a caller-provided id.
    pub fn with_id(id: impl Into<BlockId>, kind: BlockType, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
        }
    }
}

/// Titled, ordered collection of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    /// Display glyph shown next to the title.
    pub emoji: String,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Unix epoch milliseconds of the last applied mutation.
    pub updated_at: i64,
}

impl Document {
    /// Creates a blank document: generated id, empty emoji/title and one
    /// empty text block.
    pub fn blank(updated_at: i64) -> Self {
        Self {
            id: id::document_id(),
            emoji: String::new(),
            title: String::new(),
            blocks: vec![Block::empty_text()],
            updated_at,
        }
    }

    /// Returns the position of a block by id.
    pub fn block_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == block_id)
    }

    /// Returns a block by id.
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub(crate) fn block_mut(&mut self, block_id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == block_id)
    }
}

/// Editable document-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentField {
    Emoji(String),
    Title(String),
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockType, Document};

    #[test]
    fn block_type_uses_stored_tags() {
        let block = Block::with_id("b1", BlockType::Quote, "quoted");
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"id":"b1","type":"blockquote","content":"quoted"}"#);
    }

    #[test]
    fn document_uses_camel_case_timestamp() {
        let mut doc = Document::blank(42);
        doc.id = "doc_x".to_string();
        doc.blocks = vec![Block::with_id("b1", BlockType::Heading1, "Hi")];
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["updatedAt"], 42);
        assert_eq!(value["blocks"][0]["type"], "h1");
    }

    #[test]
    fn blank_document_has_one_empty_text_block() {
        let doc = Document::blank(0);
        assert!(doc.id.starts_with("doc_"));
        assert!(doc.emoji.is_empty());
        assert!(doc.title.is_empty());
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockType::Text);
        assert!(doc.blocks[0].content.is_empty());
    }
}
