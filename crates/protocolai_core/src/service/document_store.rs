//! Document store use-case service.
//!
//! # Responsibility
//! - Own the in-memory ordered document collection and the active pointer.
//! - Apply document/block edit operations and persist after each one.
//!
//! # Invariants
//! - A document never drops below one block; removal of the last block is
//!   refused.
//! - Operations on unknown ids are no-ops reported as `NotFound`.
//! - Every `Applied` mutation triggers exactly one save; other outcomes
//!   trigger none.
//! - A failed save is logged and never rolls back or blocks editing.

use crate::model::document::{Block, BlockId, BlockType, Document, DocumentField, DocumentId};
use crate::model::seed::initial_documents;
use crate::repo::document_repo::{DocumentRepository, RepoResult};
use log::{debug, error, info, warn};

/// Result kind of one store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// State changed and was handed to persistence.
    Applied,
    /// Target document/block/index does not exist; nothing changed.
    NotFound,
    /// Operation would break a document invariant; nothing changed.
    Refused,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// In-memory document collection backed by a persistence repository.
pub struct DocumentStore<R: DocumentRepository> {
    repo: R,
    documents: Vec<Document>,
    active_id: Option<DocumentId>,
}

impl<R: DocumentRepository> DocumentStore<R> {
    /// Loads the collection from `repo`, seeding first-run content when the
    /// slot is empty. The first document becomes active.
    ///
    /// Stored documents without blocks get one empty text block; the repair
    /// is written back with the next applied mutation.
    ///
    /// # Errors
    /// - Returns repository errors for unreadable or undecodable slot data.
    pub fn load(repo: R) -> RepoResult<Self> {
        let (mut documents, seeded) = match repo.load_documents()? {
            Some(documents) => (documents, false),
            None => (initial_documents(epoch_millis()), true),
        };
        // Every document keeps at least one block.
        for doc in documents.iter_mut().filter(|doc| doc.blocks.is_empty()) {
            warn!("event=store_load module=store status=repaired doc_id={} reason=no_blocks", doc.id);
            doc.blocks.push(Block::empty_text());
        }
        let active_id = documents.first().map(|doc| doc.id.clone());
        info!(
            "event=store_load module=store status=ok documents={} seeded={}",
            documents.len(),
            seeded
        );
        Ok(Self {
            repo,
            documents,
            active_id,
        })
    }

    /// Returns all documents in sidebar order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Returns one document by id.
    pub fn document(&self, doc_id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == doc_id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active_id.as_deref().and_then(|id| self.document(id))
    }

    /// Returns the backing repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Switches the active document. Not persisted.
    pub fn set_active(&mut self, doc_id: &str) -> MutationOutcome {
        if self.document(doc_id).is_none() {
            return MutationOutcome::NotFound;
        }
        self.active_id = Some(doc_id.to_string());
        MutationOutcome::Applied
    }

    /// Creates a blank document, appends it and makes it active.
    pub fn create_document(&mut self) -> Document {
        let document = Document::blank(epoch_millis());
        self.documents.push(document.clone());
        self.active_id = Some(document.id.clone());
        self.persist("create_document");
        document
    }

    /// Removes a document. Callers gate this behind user confirmation.
    ///
    /// When the removed document was active, activation falls back to the
    /// first remaining document, or to none.
    pub fn delete_document(&mut self, doc_id: &str) -> MutationOutcome {
        let Some(index) = self.documents.iter().position(|doc| doc.id == doc_id) else {
            return MutationOutcome::NotFound;
        };
        self.documents.remove(index);
        if self.active_id.as_deref() == Some(doc_id) {
            self.active_id = self.documents.first().map(|doc| doc.id.clone());
        }
        self.persist("delete_document");
        MutationOutcome::Applied
    }

    /// Replaces the emoji or title of a document.
    pub fn update_document_field(&mut self, doc_id: &str, field: DocumentField) -> MutationOutcome {
        self.mutate_document(doc_id, "update_document_field", |doc| {
            match field {
                DocumentField::Emoji(value) => doc.emoji = value,
                DocumentField::Title(value) => doc.title = value,
            }
            MutationOutcome::Applied
        })
    }

    /// Inserts `block` right after `after_index`, clamped to the end.
    pub fn insert_block(&mut self, doc_id: &str, after_index: usize, block: Block) -> MutationOutcome {
        self.mutate_document(doc_id, "insert_block", |doc| {
            let position = after_index.saturating_add(1).min(doc.blocks.len());
            doc.blocks.insert(position, block);
            MutationOutcome::Applied
        })
    }

    /// Inserts an empty text block after `after_index` and returns its id.
    pub fn add_block(&mut self, doc_id: &str, after_index: usize) -> Option<BlockId> {
        let block = Block::empty_text();
        let block_id = block.id.clone();
        self.insert_block(doc_id, after_index, block)
            .is_applied()
            .then_some(block_id)
    }

    /// Appends `block` at the end of the document.
    pub fn append_block(&mut self, doc_id: &str, block: Block) -> MutationOutcome {
        self.mutate_document(doc_id, "append_block", |doc| {
            doc.blocks.push(block);
            MutationOutcome::Applied
        })
    }

    /// Removes a block unless it is the document's only block.
    pub fn remove_block(&mut self, doc_id: &str, block_id: &str) -> MutationOutcome {
        self.mutate_document(doc_id, "remove_block", |doc| {
            let Some(index) = doc.block_index(block_id) else {
                return MutationOutcome::NotFound;
            };
            if doc.blocks.len() <= 1 {
                return MutationOutcome::Refused;
            }
            doc.blocks.remove(index);
            MutationOutcome::Applied
        })
    }

    /// Moves the block at `from_index` so it ends up at `to_index`.
    ///
    /// `to_index` is clamped to the end; all other blocks keep their
    /// relative order.
    pub fn reorder_block(&mut self, doc_id: &str, from_index: usize, to_index: usize) -> MutationOutcome {
        self.mutate_document(doc_id, "reorder_block", |doc| {
            if from_index >= doc.blocks.len() {
                return MutationOutcome::NotFound;
            }
            let block = doc.blocks.remove(from_index);
            let target = to_index.min(doc.blocks.len());
            doc.blocks.insert(target, block);
            MutationOutcome::Applied
        })
    }

    /// Changes a block's type, keeping its content.
    pub fn retype_block(&mut self, doc_id: &str, block_id: &str, kind: BlockType) -> MutationOutcome {
        self.mutate_document(doc_id, "retype_block", |doc| match doc.block_mut(block_id) {
            Some(block) => {
                block.kind = kind;
                MutationOutcome::Applied
            }
            None => MutationOutcome::NotFound,
        })
    }

    /// Replaces a block's content.
    pub fn update_block_content(
        &mut self,
        doc_id: &str,
        block_id: &str,
        content: impl Into<String>,
    ) -> MutationOutcome {
        let content = content.into();
        self.mutate_document(doc_id, "update_block_content", |doc| {
            match doc.block_mut(block_id) {
                Some(block) => {
                    block.content = content;
                    MutationOutcome::Applied
                }
                None => MutationOutcome::NotFound,
            }
        })
    }

    fn mutate_document(
        &mut self,
        doc_id: &str,
        op: &'static str,
        apply: impl FnOnce(&mut Document) -> MutationOutcome,
    ) -> MutationOutcome {
        let Some(doc) = self.documents.iter_mut().find(|doc| doc.id == doc_id) else {
            debug!("event=store_mutation module=store status=noop op={op} reason=document_not_found");
            return MutationOutcome::NotFound;
        };

        let outcome = apply(doc);
        match outcome {
            MutationOutcome::Applied => {
                doc.updated_at = epoch_millis();
                self.persist(op);
            }
            MutationOutcome::NotFound => {
                debug!("event=store_mutation module=store status=noop op={op} reason=not_found");
            }
            MutationOutcome::Refused => {
                debug!("event=store_mutation module=store status=noop op={op} reason=refused");
            }
        }
        outcome
    }

    fn persist(&self, op: &'static str) {
        match self.repo.save_documents(&self.documents) {
            Ok(()) => debug!(
                "event=documents_save module=store status=ok op={op} documents={}",
                self.documents.len()
            ),
            Err(err) => error!(
                "event=documents_save module=store status=error op={op} error={err}"
            ),
        }
    }
}

fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, MutationOutcome};
    use crate::model::document::{Block, BlockType};
    use crate::repo::document_repo::InMemoryDocumentRepository;

    fn block_ids(store: &DocumentStore<InMemoryDocumentRepository>, doc_id: &str) -> Vec<String> {
        store
            .document(doc_id)
            .unwrap()
            .blocks
            .iter()
            .map(|block| block.id.clone())
            .collect()
    }

    #[test]
    fn insert_block_clamps_past_the_end() {
        let mut store = DocumentStore::load(InMemoryDocumentRepository::new()).unwrap();
        let doc_id = store.create_document().id;
        let outcome = store.insert_block(&doc_id, 99, Block::with_id("tail", BlockType::Code, "x"));
        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(block_ids(&store, &doc_id).last().map(String::as_str), Some("tail"));
    }

    #[test]
    fn reorder_with_out_of_range_source_is_not_found() {
        let mut store = DocumentStore::load(InMemoryDocumentRepository::new()).unwrap();
        let before = store.repository().save_count();
        let outcome = store.reorder_block("doc_first", 100, 0);
        assert_eq!(outcome, MutationOutcome::NotFound);
        assert_eq!(store.repository().save_count(), before);
    }

    #[test]
    fn set_active_rejects_unknown_document() {
        let mut store = DocumentStore::load(InMemoryDocumentRepository::new()).unwrap();
        assert_eq!(store.set_active("doc_missing"), MutationOutcome::NotFound);
        assert_eq!(store.active_id(), Some("doc_first"));
    }
}
