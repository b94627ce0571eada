//! Repository layer: durable storage behind the persistence bridge.
//!
//! # Responsibility
//! - Define the document collection storage contract.
//! - Isolate SQLite and JSON encoding details from the store.
//!
//! # Invariants
//! - A save always writes the full collection.

pub mod document_repo;
