//! Sync dispatch and agent invocation state machine.
//!
//! # Responsibility
//! - Build sync (`type "1"`) and interaction (`type "0"`) requests and tag
//!   them with request tokens.
//! - Interpret replies into recommendation overlays or routed results.
//! - Drive the region through `Idle -> Loading -> Idle` and
//!   `Idle -> Recommending -> {Idle | Loading}`.
//!
//! # Invariants
//! - A newer sync supersedes an older one; a cancelled or superseded sync
//!   reply is discarded.
//! - Entering `Loading` clears any recommendation; a sync reply arriving
//!   while loading is not shown.
//! - Completing the current invocation returns the region to `Idle` for
//!   every outcome.
//!
//! The engine performs no I/O; callers send the returned requests through an
//! `AgentBridge` and feed the results back.

use crate::interaction::region::{InteractionRegion, Recommendation, RequestToken};
use crate::model::document::DocumentId;
use crate::sync::bridge::{BridgeError, BridgeResult};
use crate::sync::protocol::{parse_agent_list, BridgeRequest, BridgeResponse};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

/// Text used when an agent reply carries no `data`.
pub const FALLBACK_RESULT_TEXT: &str = "The agent returned no result.";

static BLOCK_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)todo|list|write").expect("valid agent route regex"));

/// Where an invocation result goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRoute {
    /// Appended to the document as a new block.
    AppendBlock,
    /// Shown as a toast titled with the agent name.
    Toast,
}

/// Picks the result route from the agent name (case-insensitive substring
/// match on `todo`, `list` or `write`).
pub fn route_for_agent(agent_name: &str) -> ResultRoute {
    if BLOCK_ROUTE_RE.is_match(agent_name) {
        ResultRoute::AppendBlock
    } else {
        ResultRoute::Toast
    }
}

/// A request ready to be sent, with the token its reply must carry back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub token: RequestToken,
    pub request: BridgeRequest,
}

/// Result of applying a sync reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Overlay installed for `document_id`.
    Recommended {
        document_id: DocumentId,
        agents: Vec<String>,
    },
    /// Reply parsed but listed no agents; region untouched.
    NoAgents,
    /// Reply arrived while an invocation was loading; not shown.
    Suppressed,
    /// Reply belongs to a superseded or cancelled request; discarded.
    Stale,
    /// Transport or decode failure; region untouched.
    Failed,
}

/// Result of applying an invocation reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    AppendBlock {
        document_id: DocumentId,
        agent: String,
        text: String,
    },
    ShowResult {
        agent: String,
        text: String,
    },
    Failed {
        agent: String,
        error: String,
    },
    /// Reply belongs to a request that is no longer loading; discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSync {
    token: RequestToken,
    document_id: DocumentId,
}

/// Request/reply state machine for sync and agent invocation.
#[derive(Debug)]
pub struct AgentEngine {
    region: InteractionRegion,
    pending_sync: Option<PendingSync>,
    next_token: u64,
    recommendation_ttl: Duration,
}

impl AgentEngine {
    pub fn new(recommendation_ttl: Duration) -> Self {
        Self {
            region: InteractionRegion::Idle,
            pending_sync: None,
            next_token: 1,
            recommendation_ttl,
        }
    }

    pub fn region(&self) -> &InteractionRegion {
        &self.region
    }

    /// Token of the sync request whose reply is still accepted.
    pub fn pending_sync_token(&self) -> Option<RequestToken> {
        self.pending_sync.as_ref().map(|pending| pending.token)
    }

    /// Builds a sync request, superseding any earlier pending sync.
    pub fn begin_sync(&mut self, document_id: &str, payload: String) -> OutgoingRequest {
        let token = self.issue_token();
        if let Some(previous) = self.pending_sync.replace(PendingSync {
            token,
            document_id: document_id.to_string(),
        }) {
            debug!(
                "event=sync_superseded module=engine token={} by={}",
                previous.token, token
            );
        }
        info!(
            "event=sync_dispatch module=engine status=start token={} doc_id={} bytes={}",
            token,
            document_id,
            payload.len()
        );
        OutgoingRequest {
            token,
            request: BridgeRequest::sync(document_id, payload),
        }
    }

    /// Drops the pending sync so its reply will be discarded.
    pub fn cancel_pending_sync(&mut self) -> Option<RequestToken> {
        let cancelled = self.pending_sync.take().map(|pending| pending.token);
        if let Some(token) = cancelled {
            debug!("event=sync_cancelled module=engine token={token}");
        }
        cancelled
    }

    /// Applies a sync reply.
    pub fn complete_sync(
        &mut self,
        token: RequestToken,
        result: BridgeResult<BridgeResponse>,
        now: Instant,
    ) -> SyncOutcome {
        let pending = match self.pending_sync.take() {
            Some(pending) if pending.token == token => pending,
            other => {
                self.pending_sync = other;
                debug!("event=sync_reply module=engine status=stale token={token}");
                return SyncOutcome::Stale;
            }
        };

        let data = match result.and_then(require_data) {
            Ok(data) => data,
            Err(err) => {
                warn!(
                    "event=sync_reply module=engine status=error token={token} doc_id={} error={err}",
                    pending.document_id
                );
                return SyncOutcome::Failed;
            }
        };

        let agents = parse_agent_list(&data);
        if agents.is_empty() {
            info!("event=sync_reply module=engine status=ok token={token} agents=0");
            return SyncOutcome::NoAgents;
        }
        if self.region.is_loading() {
            info!("event=sync_reply module=engine status=suppressed token={token} reason=loading");
            return SyncOutcome::Suppressed;
        }

        info!(
            "event=sync_reply module=engine status=ok token={token} doc_id={} agents={}",
            pending.document_id,
            agents.len()
        );
        self.region = InteractionRegion::Recommending(Recommendation {
            document_id: pending.document_id.clone(),
            agents: agents.clone(),
            expires_at: now + self.recommendation_ttl,
        });
        SyncOutcome::Recommended {
            document_id: pending.document_id,
            agents,
        }
    }

    /// Enters `Loading` for an invocation of `agent_name` against
    /// `document_id`, clearing any recommendation.
    ///
    /// A second call while loading replaces the in-flight token, so the older
    /// reply is discarded.
    pub fn begin_invoke(
        &mut self,
        agent_name: &str,
        document_id: &str,
        payload: String,
    ) -> OutgoingRequest {
        let token = self.issue_token();
        let request = BridgeRequest::interact(agent_name, payload);
        info!(
            "event=agent_invoke module=engine status=start token={} agent={} doc_id={}",
            token, request.id, document_id
        );
        self.region = InteractionRegion::Loading {
            token,
            agent: request.id.clone(),
            document_id: document_id.to_string(),
        };
        OutgoingRequest { token, request }
    }

    /// Applies an invocation reply and returns the region to `Idle`.
    pub fn complete_invoke(
        &mut self,
        token: RequestToken,
        result: BridgeResult<BridgeResponse>,
    ) -> InvokeOutcome {
        let (agent, document_id) = match &self.region {
            InteractionRegion::Loading {
                token: current,
                agent,
                document_id,
            } if *current == token => (agent.clone(), document_id.clone()),
            _ => {
                debug!("event=agent_reply module=engine status=stale token={token}");
                return InvokeOutcome::Stale;
            }
        };
        self.region = InteractionRegion::Idle;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "event=agent_reply module=engine status=error token={token} agent={agent} error={err}"
                );
                return InvokeOutcome::Failed {
                    agent,
                    error: err.to_string(),
                };
            }
        };

        let text = response
            .data
            .unwrap_or_else(|| FALLBACK_RESULT_TEXT.to_string());
        let route = route_for_agent(&agent);
        info!(
            "event=agent_reply module=engine status=ok token={token} agent={agent} route={route:?} bytes={}",
            text.len()
        );
        match route {
            ResultRoute::AppendBlock => InvokeOutcome::AppendBlock {
                document_id,
                agent,
                text,
            },
            ResultRoute::Toast => InvokeOutcome::ShowResult { agent, text },
        }
    }

    /// Clears a shown recommendation. Returns whether one was shown.
    pub fn dismiss_recommendation(&mut self) -> bool {
        if self.region.recommendation().is_some() {
            self.region = InteractionRegion::Idle;
            return true;
        }
        false
    }

    /// Expires the recommendation overlay once its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .region
            .recommendation()
            .is_some_and(|recommendation| now >= recommendation.expires_at);
        if expired {
            debug!("event=recommendation_expired module=engine");
            self.region = InteractionRegion::Idle;
        }
        expired
    }

    fn issue_token(&mut self) -> RequestToken {
        let token = RequestToken::new(self.next_token);
        self.next_token += 1;
        token
    }
}

fn require_data(response: BridgeResponse) -> BridgeResult<String> {
    response
        .data
        .ok_or_else(|| BridgeError::Malformed("reply has no `data` field".to_string()))
}
