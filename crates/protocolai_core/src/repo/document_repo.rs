//! Document collection persistence contracts and implementations.
//!
//! # Responsibility
//! - Persist the whole document collection in one durable key/value slot.
//! - Keep SQL and JSON encoding details inside the repository boundary.
//!
//! # Invariants
//! - The slot holds the full collection as a JSON array; writes overwrite it.
//! - Reads reject undecodable slot content instead of masking it.

use crate::db::DbError;
use crate::model::document::Document;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the document collection slot.
pub const DOCUMENTS_SLOT_KEY: &str = "protocolai-final-data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Slot content could not be encoded or decoded as a document list.
    InvalidData(String),
    /// Connection is missing the `kv_slots` table.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "document repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Durable storage for the document collection.
pub trait DocumentRepository {
    /// Loads the stored collection; `None` when nothing was ever saved.
    fn load_documents(&self) -> RepoResult<Option<Vec<Document>>>;
    /// Overwrites the stored collection.
    fn save_documents(&self, documents: &[Document]) -> RepoResult<()>;
}

/// SQLite-backed document repository over the `kv_slots` table.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'kv_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("kv_slots"));
        }
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load_documents(&self) -> RepoResult<Option<Vec<Document>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT slot_value FROM kv_slots WHERE slot_key = ?1;",
                [DOCUMENTS_SLOT_KEY],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|value| decode_documents(&value)).transpose()
    }

    fn save_documents(&self, documents: &[Document]) -> RepoResult<()> {
        let encoded = serde_json::to_string(documents)?;
        self.conn.execute(
            "INSERT INTO kv_slots (slot_key, slot_value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(slot_key) DO UPDATE SET
                slot_value = excluded.slot_value,
                updated_at = excluded.updated_at;",
            params![DOCUMENTS_SLOT_KEY, encoded],
        )?;
        Ok(())
    }
}

/// In-process repository keeping the encoded slot in memory.
///
/// Encodes through the same JSON shape as the SQLite slot.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    slot: RefCell<Option<String>>,
    saves: Cell<usize>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose slot already holds `raw`.
    pub fn with_raw_slot(raw: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(raw.into())),
            saves: Cell::new(0),
        }
    }

    /// Number of successful saves since construction.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// Raw encoded slot content.
    pub fn raw_slot(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl DocumentRepository for InMemoryDocumentRepository {
    fn load_documents(&self) -> RepoResult<Option<Vec<Document>>> {
        self.slot
            .borrow()
            .as_deref()
            .map(decode_documents)
            .transpose()
    }

    fn save_documents(&self, documents: &[Document]) -> RepoResult<()> {
        let encoded = serde_json::to_string(documents)?;
        *self.slot.borrow_mut() = Some(encoded);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn load_documents(&self) -> RepoResult<Option<Vec<Document>>> {
        (**self).load_documents()
    }

    fn save_documents(&self, documents: &[Document]) -> RepoResult<()> {
        (**self).save_documents(documents)
    }
}

fn decode_documents(raw: &str) -> RepoResult<Vec<Document>> {
    serde_json::from_str(raw).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::{DocumentRepository, InMemoryDocumentRepository, RepoError};
    use crate::model::seed::initial_documents;

    #[test]
    fn in_memory_repository_starts_empty() {
        let repo = InMemoryDocumentRepository::new();
        assert!(repo.load_documents().unwrap().is_none());
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn in_memory_repository_round_trips_and_counts_saves() {
        let repo = InMemoryDocumentRepository::new();
        let docs = initial_documents(7);
        repo.save_documents(&docs).unwrap();
        assert_eq!(repo.load_documents().unwrap(), Some(docs));
        assert_eq!(repo.save_count(), 1);
    }

    #[test]
    fn corrupt_slot_is_reported_as_invalid_data() {
        let repo = InMemoryDocumentRepository::with_raw_slot("{not json");
        let err = repo.load_documents().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
