//! Document/block domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the store, serializer and
//!   persistence layers.
//! - Provide first-run seed content.
//!
//! # Invariants
//! - Every document owns at least one block.
//! - Block order is significant and caller-controlled.

pub mod document;
pub mod seed;
