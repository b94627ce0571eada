//! `export` command: print a stored document as its sync payload.

use protocolai_core::db::open_db;
use protocolai_core::{
    serialize_document, table_of_contents, BlockType, DocumentStore, SqliteDocumentRepository,
};
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;

/// Renders one document from the database at `db_path`.
///
/// An empty database renders the first-run content without writing it back.
pub fn render(db_path: &Path, doc_id: Option<&str>, with_toc: bool) -> Result<String, Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let repo = SqliteDocumentRepository::try_new(&conn)?;
    let store = DocumentStore::load(repo)?;

    let document = match doc_id {
        Some(id) => store
            .document(id)
            .ok_or_else(|| format!("document `{id}` not found"))?,
        None => store
            .documents()
            .first()
            .ok_or("no documents stored")?,
    };

    let mut out = serialize_document(document);
    out.push('\n');
    if with_toc {
        out.push_str("\n--- outline ---\n");
        for entry in table_of_contents(document) {
            let indent = if entry.level == BlockType::Heading2 { "  " } else { "" };
            writeln!(out, "{indent}- {} [{}]", entry.label, entry.block_id)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::render;
    use protocolai_core::db::open_db;
    use protocolai_core::{Block, BlockType, Document, DocumentRepository, SqliteDocumentRepository};

    #[test]
    fn empty_database_renders_welcome_document() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("protocolai.db");

        let out = render(&db, None, true).unwrap();
        assert!(out.starts_with("TITLE: Welcome to ProtoColAi\n\n# Editor Specifications\n"));
        assert!(out.contains("- Editor Specifications [b1]"));
        assert!(out.contains("  - 1. Block Management [b3]"));
    }

    #[test]
    fn renders_requested_document_and_rejects_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("protocolai.db");
        {
            let conn = open_db(&db).unwrap();
            let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
            let document = Document {
                id: "doc_notes".to_string(),
                emoji: String::new(),
                title: "Notes".to_string(),
                blocks: vec![Block::with_id("n1", BlockType::Quote, "hi")],
                updated_at: 0,
            };
            repo.save_documents(&[document]).unwrap();
        }

        assert_eq!(render(&db, Some("doc_notes"), false).unwrap(), "TITLE: Notes\n\n> hi\n");
        let err = render(&db, Some("doc_missing"), false).unwrap_err();
        assert!(err.to_string().contains("doc_missing"));
    }
}
