//! Core use-case services.
//!
//! # Responsibility
//! - Apply edit operations over the document collection with persistence.
//! - Orchestrate change detection, sync and agent invocation for the UI.

pub mod document_store;
pub mod editor_session;
