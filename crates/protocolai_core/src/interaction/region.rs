//! Overlay/loading region shared by sync recommendations and invocations.

use crate::model::document::DocumentId;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Identifies one outstanding bridge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for RequestToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Agents suggested for a document after a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub document_id: DocumentId,
    /// Agent names in the order the service returned them.
    pub agents: Vec<String>,
    pub expires_at: Instant,
}

/// The single process-wide overlay region.
///
/// `Loading` and `Recommending` can never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionRegion {
    #[default]
    Idle,
    /// An invocation is in flight.
    Loading {
        token: RequestToken,
        agent: String,
        document_id: DocumentId,
    },
    /// A recommendation overlay is shown.
    Recommending(Recommendation),
}

impl InteractionRegion {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Self::Recommending(recommendation) => Some(recommendation),
            _ => None,
        }
    }
}
