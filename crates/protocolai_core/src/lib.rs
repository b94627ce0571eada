//! Core domain logic for the ProtoColAi block editor.
//! This crate is the single source of truth for document invariants and the
//! agent sync/interaction state machine.

pub mod config;
pub mod db;
pub mod export;
pub mod id;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{BridgeConfig, ConfigError, EditorConfig, ResponseReadMode};
pub use export::outline::{display_title, sidebar_hint, table_of_contents, OutlineEntry};
pub use export::payload::serialize_document;
pub use interaction::engine::{
    route_for_agent, AgentEngine, InvokeOutcome, OutgoingRequest, ResultRoute, SyncOutcome,
};
pub use interaction::notification::{
    Notification, NotificationKind, NotificationLevel, NotificationQueue,
};
pub use interaction::region::{InteractionRegion, Recommendation, RequestToken};
pub use logging::{default_log_level, init_logging, LogLevel};
pub use model::document::{Block, BlockId, BlockType, Document, DocumentField, DocumentId};
pub use repo::document_repo::{
    DocumentRepository, InMemoryDocumentRepository, RepoError, RepoResult,
    SqliteDocumentRepository,
};
pub use service::document_store::{DocumentStore, MutationOutcome};
pub use service::editor_session::EditorSession;
pub use sync::bridge::{AgentBridge, BridgeError, BridgeResult, TcpAgentBridge};
pub use sync::change_detector::{ChangeDetector, FieldChange};
pub use sync::protocol::{BridgeRequest, BridgeResponse, RequestKind};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
