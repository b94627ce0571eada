//! Agent interaction state: toasts, the overlay/loading region, and the
//! engine driving sync and invocation requests.
//!
//! # Responsibility
//! - Track outstanding bridge requests by token and discard stale replies.
//! - Keep the recommendation overlay and the loading indicator mutually
//!   exclusive.
//! - Expire toasts and overlays by deadline.
//!
//! # Invariants
//! - Only the latest sync request may install a recommendation.
//! - Completing the current invocation always returns the region to idle.

pub mod engine;
pub mod notification;
pub mod region;
