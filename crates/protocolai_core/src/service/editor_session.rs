//! Editor session: the explicit application state behind the UI.
//!
//! # Responsibility
//! - Compose the document store, change detector, agent engine and toast
//!   queue, and expose the UI-event entry points.
//! - Route agent results into the store or the toast queue.
//!
//! # Invariants
//! - The session owns its store and hands out only shared references, so
//!   activation, creation and deletion always pass through the session.
//! - Document deletion only happens through request + confirm.
//! - Switching documents cancels the pending sync.
//! - Bridge failures never reach the document model; they become toasts or
//!   log lines.
//!
//! Event hosts that must keep editing while a request is in flight use the
//! split API (`blur_field`/`select_agent` to build a request, then
//! `apply_sync_response`/`apply_invoke_response` when the reply lands).
//! `run_sync`/`run_invoke` do both around one bridge round-trip.

use crate::config::EditorConfig;
use crate::export::payload::{serialize_document, snippet};
use crate::interaction::engine::{AgentEngine, InvokeOutcome, OutgoingRequest, SyncOutcome};
use crate::interaction::notification::{
    NotificationDraft, NotificationKind, NotificationLevel, NotificationQueue,
};
use crate::interaction::region::{InteractionRegion, RequestToken};
use crate::model::document::{Block, BlockId, BlockType, Document, DocumentField, DocumentId};
use crate::repo::document_repo::DocumentRepository;
use crate::service::document_store::{DocumentStore, MutationOutcome};
use crate::sync::bridge::{AgentBridge, BridgeResult};
use crate::sync::change_detector::{ChangeDetector, FieldChange};
use crate::sync::protocol::BridgeResponse;
use log::{info, warn};
use std::time::Instant;

const CHANGE_SNIPPET_CHARS: usize = 40;
const PAYLOAD_SNIPPET_CHARS: usize = 100;

/// UI-facing editor state.
pub struct EditorSession<R: DocumentRepository, B: AgentBridge> {
    store: DocumentStore<R>,
    bridge: B,
    detector: ChangeDetector,
    engine: AgentEngine,
    notifications: NotificationQueue,
    focus_target: Option<BlockId>,
    pending_deletion: Option<DocumentId>,
}

impl<R: DocumentRepository, B: AgentBridge> EditorSession<R, B> {
    pub fn new(config: &EditorConfig, store: DocumentStore<R>, bridge: B) -> Self {
        Self {
            store,
            bridge,
            detector: ChangeDetector::new(),
            engine: AgentEngine::new(config.recommendation_ttl),
            notifications: NotificationQueue::new(config.toast_ttl),
            focus_target: None,
            pending_deletion: None,
        }
    }

    /// Read access to the documents.
    ///
    /// Lifecycle changes go through the session so pending syncs and the
    /// deletion gate stay consistent:
    ///
    /// ```compile_fail
    /// use protocolai_core::{AgentBridge, DocumentRepository, EditorSession};
    ///
    /// fn switch_behind_the_session<R: DocumentRepository, B: AgentBridge>(
    ///     session: &mut EditorSession<R, B>,
    /// ) {
    ///     session.store().set_active("doc_first");
    /// }
    /// ```
    pub fn store(&self) -> &DocumentStore<R> {
        &self.store
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn region(&self) -> &InteractionRegion {
        self.engine.region()
    }

    /// Block the view should scroll to and focus, if any.
    pub fn focus_target(&self) -> Option<&str> {
        self.focus_target.as_deref()
    }

    /// Returns and clears the focus target once the view consumed it.
    pub fn take_focus_target(&mut self) -> Option<BlockId> {
        self.focus_target.take()
    }

    pub fn pending_deletion(&self) -> Option<&str> {
        self.pending_deletion.as_deref()
    }

    /// Creates a blank document and makes it active.
    pub fn create_document(&mut self) -> Document {
        self.engine.cancel_pending_sync();
        self.store.create_document()
    }

    /// Makes `doc_id` active; a real switch cancels the pending sync.
    pub fn switch_document(&mut self, doc_id: &str) -> MutationOutcome {
        let previous = self.store.active_id().map(str::to_string);
        let outcome = self.store.set_active(doc_id);
        if outcome.is_applied() && previous.as_deref() != Some(doc_id) {
            self.engine.cancel_pending_sync();
        }
        outcome
    }

    /// Adds an empty text block after `after_index` in the active document
    /// and makes it the focus target.
    pub fn add_block(&mut self, after_index: usize) -> Option<BlockId> {
        let doc_id = self.store.active_id()?.to_string();
        let block_id = self.store.add_block(&doc_id, after_index)?;
        self.focus_target = Some(block_id.clone());
        Some(block_id)
    }

    /// Replaces the emoji or title of a document.
    pub fn update_document_field(&mut self, doc_id: &str, field: DocumentField) -> MutationOutcome {
        self.store.update_document_field(doc_id, field)
    }

    /// Inserts `block` right after `after_index`.
    pub fn insert_block(&mut self, doc_id: &str, after_index: usize, block: Block) -> MutationOutcome {
        self.store.insert_block(doc_id, after_index, block)
    }

    /// Removes a block; the last block of a document is kept.
    pub fn remove_block(&mut self, doc_id: &str, block_id: &str) -> MutationOutcome {
        self.store.remove_block(doc_id, block_id)
    }

    pub fn reorder_block(&mut self, doc_id: &str, from_index: usize, to_index: usize) -> MutationOutcome {
        self.store.reorder_block(doc_id, from_index, to_index)
    }

    pub fn retype_block(&mut self, doc_id: &str, block_id: &str, kind: BlockType) -> MutationOutcome {
        self.store.retype_block(doc_id, block_id, kind)
    }

    /// Records typed content; syncing waits for the field's blur.
    pub fn update_block_content(
        &mut self,
        doc_id: &str,
        block_id: &str,
        content: impl Into<String>,
    ) -> MutationOutcome {
        self.store.update_block_content(doc_id, block_id, content)
    }

    /// First step of document deletion. Returns `false` for unknown ids.
    pub fn request_document_deletion(&mut self, doc_id: &str) -> bool {
        if self.store.document(doc_id).is_none() {
            return false;
        }
        self.pending_deletion = Some(doc_id.to_string());
        true
    }

    /// Applies the requested deletion.
    pub fn confirm_document_deletion(&mut self) -> MutationOutcome {
        let Some(doc_id) = self.pending_deletion.take() else {
            return MutationOutcome::NotFound;
        };
        let was_active = self.store.active_id() == Some(doc_id.as_str());
        let outcome = self.store.delete_document(&doc_id);
        if outcome.is_applied() && was_active {
            self.engine.cancel_pending_sync();
        }
        outcome
    }

    pub fn cancel_document_deletion(&mut self) {
        self.pending_deletion = None;
    }

    /// Records the value of the field gaining focus.
    pub fn focus_field(&mut self, value: &str) {
        self.detector.focus(value);
    }

    /// Handles a field losing focus.
    ///
    /// When the value changed, raises a sync toast and returns the sync
    /// request for the active document.
    pub fn blur_field(&mut self, value: &str, now: Instant) -> Option<OutgoingRequest> {
        let FieldChange::Changed(changed) = self.detector.blur(value) else {
            return None;
        };
        let document = self.store.active_document()?;
        let doc_id = document.id.clone();
        let payload = serialize_document(document);

        self.notifications.push_draft(
            NotificationDraft::new(
                format!("Sync Request • {doc_id}"),
                snippet(&changed, CHANGE_SNIPPET_CHARS),
                NotificationKind::Sync,
            )
            .with_detail(snippet(&payload, PAYLOAD_SNIPPET_CHARS)),
            now,
        );
        Some(self.engine.begin_sync(&doc_id, payload))
    }

    /// Applies a sync reply.
    pub fn apply_sync_response(
        &mut self,
        token: RequestToken,
        result: BridgeResult<BridgeResponse>,
        now: Instant,
    ) -> SyncOutcome {
        self.engine.complete_sync(token, result, now)
    }

    /// Sends a sync request and applies its reply.
    pub async fn run_sync(&mut self, outgoing: OutgoingRequest) -> SyncOutcome {
        let result = self.bridge.exchange(&outgoing.request).await;
        self.apply_sync_response(outgoing.token, result, Instant::now())
    }

    /// Starts an invocation of `agent_name` against the active document.
    ///
    /// Returns `None` when no document is active.
    pub fn select_agent(&mut self, agent_name: &str) -> Option<OutgoingRequest> {
        let document = self.store.active_document()?;
        let doc_id = document.id.clone();
        let payload = serialize_document(document);
        Some(self.engine.begin_invoke(agent_name, &doc_id, payload))
    }

    /// Applies an invocation reply and routes its result.
    pub fn apply_invoke_response(
        &mut self,
        token: RequestToken,
        result: BridgeResult<BridgeResponse>,
        now: Instant,
    ) -> InvokeOutcome {
        let outcome = self.engine.complete_invoke(token, result);
        match &outcome {
            InvokeOutcome::AppendBlock {
                document_id,
                agent,
                text,
            } => {
                let block = Block::new(BlockType::Text, text.clone());
                let block_id = block.id.clone();
                if self.store.append_block(document_id, block).is_applied() {
                    info!("event=agent_result module=session route=append_block agent={agent}");
                    self.focus_target = Some(block_id);
                    self.notifications.push(
                        format!("{agent} updated the document"),
                        "A new block was added at the end of the page.",
                        NotificationKind::Agent,
                        now,
                    );
                } else {
                    warn!(
                        "event=agent_result module=session status=dropped agent={agent} reason=document_not_found"
                    );
                    self.notifications.push(agent.as_str(), text.as_str(), NotificationKind::Agent, now);
                }
            }
            InvokeOutcome::ShowResult { agent, text } => {
                self.notifications.push(agent.as_str(), text.as_str(), NotificationKind::Agent, now);
            }
            InvokeOutcome::Failed { agent, .. } => {
                self.notifications.push_draft(
                    NotificationDraft::new(
                        "Agent error",
                        format!("Could not get a response from {agent}."),
                        NotificationKind::Agent,
                    )
                    .with_level(NotificationLevel::Error),
                    now,
                );
            }
            InvokeOutcome::Stale => {}
        }
        outcome
    }

    /// Sends an invocation request and applies its reply.
    pub async fn run_invoke(&mut self, outgoing: OutgoingRequest) -> InvokeOutcome {
        let result = self.bridge.exchange(&outgoing.request).await;
        self.apply_invoke_response(outgoing.token, result, Instant::now())
    }

    /// Closes the recommendation overlay without choosing an agent.
    pub fn dismiss_recommendation(&mut self) -> bool {
        self.engine.dismiss_recommendation()
    }

    pub fn dismiss_notification(&mut self, notification_id: &str) -> bool {
        self.notifications.dismiss(notification_id)
    }

    /// Expires toasts and the recommendation overlay whose deadlines passed.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);
        self.engine.tick(now);
    }
}
