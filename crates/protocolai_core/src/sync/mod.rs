//! Change synchronization with the external agent service.
//!
//! # Responsibility
//! - Decide when an edit is worth a sync round-trip.
//! - Define the agent bridge wire protocol and its TCP client.
//!
//! # Invariants
//! - Sync is best-effort: failures are logged, never raised into editing.

pub mod bridge;
pub mod change_detector;
pub mod protocol;
