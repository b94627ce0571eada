//! First-run content installed when persistent storage is empty.

use crate::model::document::{Block, BlockType, Document};

/// Id of the welcome document.
pub const WELCOME_DOCUMENT_ID: &str = "doc_first";

/// Returns the documents shown on first launch.
pub fn initial_documents(now_ms: i64) -> Vec<Document> {
    let blocks = [
        ("b1", BlockType::Heading1, "Editor Specifications"),
        (
            "b2",
            BlockType::Text,
            "ProtoColAi is a block-based, dynamic editor. Every paragraph, heading, or list item is a distinct 'chunk' of data.",
        ),
        ("b3", BlockType::Heading2, "1. Block Management"),
        ("b4", BlockType::Text, "Hover over any block to reveal controls:"),
        (
            "b5",
            BlockType::Quote,
            "Left Side: Six-dot drag handle to reorder content.\nRight Side: Menu to switch between Text, H1, H2, and Quote.",
        ),
        ("b6", BlockType::Heading2, "2. Invisible Spacers"),
        (
            "b7",
            BlockType::Text,
            "We support 'Ghost Blocks'. The space below this line contains an empty block. It is invisible until you click it.",
        ),
        ("b8", BlockType::Text, ""),
        (
            "b9",
            BlockType::Text,
            "See? Keeps the UI clean while allowing vertical whitespace.",
        ),
        ("b10", BlockType::Heading1, "Navigation & Data"),
        ("b11", BlockType::Heading2, "Sidebar TOC"),
        (
            "b12",
            BlockType::Text,
            "Look at the sidebar on the left. It automatically generates a Table of Contents based on the H1 and H2 headers in this document.",
        ),
        ("b13", BlockType::Heading2, "Smart API Sync"),
        (
            "b14",
            BlockType::Text,
            "Try editing this text and clicking away. If you change the text, a Toast appears. If you don't change anything, no request is sent.",
        ),
    ];

    vec![Document {
        id: WELCOME_DOCUMENT_ID.to_string(),
        emoji: "🧙🏻‍♂️".to_string(),
        title: "Welcome to ProtoColAi".to_string(),
        blocks: blocks
            .into_iter()
            .map(|(id, kind, content)| Block::with_id(id, kind, content))
            .collect(),
        updated_at: now_ms,
    }]
}
