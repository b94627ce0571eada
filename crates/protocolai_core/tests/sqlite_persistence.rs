use protocolai_core::db::{open_db, open_db_in_memory};
use protocolai_core::model::seed::WELCOME_DOCUMENT_ID;
use protocolai_core::repo::document_repo::DOCUMENTS_SLOT_KEY;
use protocolai_core::{
    BlockType, DocumentField, DocumentRepository, DocumentStore, RepoError,
    SqliteDocumentRepository,
};
use rusqlite::Connection;

#[test]
fn edits_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("protocolai.db");

    let created_id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
        let mut store = DocumentStore::load(repo).unwrap();
        store.update_document_field(WELCOME_DOCUMENT_ID, DocumentField::Title("Renamed".to_string()));
        let created = store.create_document();
        store.retype_block(&created.id, &created.blocks[0].id, BlockType::Heading1);
        created.id
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let store = DocumentStore::load(repo).unwrap();

    assert_eq!(store.documents().len(), 2);
    assert_eq!(store.document(WELCOME_DOCUMENT_ID).unwrap().title, "Renamed");
    let created = store.document(&created_id).unwrap();
    assert_eq!(created.blocks[0].kind, BlockType::Heading1);
}

#[test]
fn slot_stores_camel_case_json_under_fixed_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let mut store = DocumentStore::load(repo).unwrap();
    store.update_block_content(WELCOME_DOCUMENT_ID, "b8", "filled");

    let raw: String = conn
        .query_row(
            "SELECT slot_value FROM kv_slots WHERE slot_key = ?1;",
            [DOCUMENTS_SLOT_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value[0];
    assert_eq!(first["id"], WELCOME_DOCUMENT_ID);
    assert!(first["updatedAt"].is_i64());
    assert_eq!(first["blocks"][0]["type"], "h1");
    assert_eq!(first["blocks"][4]["type"], "blockquote");
    assert_eq!(first["blocks"][7]["content"], "filled");
}

#[test]
fn seeding_does_not_write_the_slot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    let _store = DocumentStore::load(&repo).unwrap();

    assert!(repo.load_documents().unwrap().is_none());
}

#[test]
fn repository_requires_migrated_schema() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteDocumentRepository::try_new(&conn) {
        Err(RepoError::MissingRequiredTable(table)) => assert_eq!(table, "kv_slots"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected missing table error"),
    }
}

#[test]
fn corrupt_slot_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_slots (slot_key, slot_value) VALUES (?1, '[{\"id\": 1}]');",
        [DOCUMENTS_SLOT_KEY],
    )
    .unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.load_documents(),
        Err(RepoError::InvalidData(_))
    ));
}
