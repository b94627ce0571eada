//! Read-only projections of documents.
//!
//! # Responsibility
//! - Produce the flat text payload sent to the agent service.
//! - Derive sidebar projections (table of contents, hints, display titles).
//!
//! # Invariants
//! - Projections never mutate the document.
//! - All projections follow block order exactly.

pub mod outline;
pub mod payload;
