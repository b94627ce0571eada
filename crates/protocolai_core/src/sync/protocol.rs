//! Agent bridge wire protocol types.
//!
//! # Invariants
//! - Requests serialize as `{"type": "0"|"1", "id": ..., "data": ...}`.
//! - Responses are tolerant: every field is optional on the wire.

use serde::{Deserialize, Serialize};

/// Request discriminator sent as the `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Direct agent call; `id` is the agent name.
    #[serde(rename = "0")]
    Interact,
    /// Content change notification; `id` is the document id.
    #[serde(rename = "1")]
    Sync,
}

impl RequestKind {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Interact => "0",
            Self::Sync => "1",
        }
    }
}

/// One request written to the agent bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub id: String,
    pub data: String,
}

impl BridgeRequest {
    /// Builds a sync request for `document_id`.
    pub fn sync(document_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Sync,
            id: document_id.into(),
            data: payload.into(),
        }
    }

    /// Builds an interaction request; the agent name is trimmed.
    pub fn interact(agent_name: &str, payload: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Interact,
            id: agent_name.trim().to_string(),
            data: payload.into(),
        }
    }
}

/// One response read from the agent bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Splits a comma-separated agent list, trimming names and dropping blanks.
pub fn parse_agent_list(data: &str) -> Vec<String> {
    data.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_agent_list, BridgeRequest, BridgeResponse, RequestKind};

    #[test]
    fn sync_request_uses_string_type_tag() {
        let request = BridgeRequest::sync("doc_first", "TITLE: x\n\n");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"type":"1","id":"doc_first","data":"TITLE: x\n\n"}"#);
    }

    #[test]
    fn interact_request_trims_agent_name() {
        let request = BridgeRequest::interact("  TodoAgent ", "payload");
        assert_eq!(request.kind, RequestKind::Interact);
        assert_eq!(request.id, "TodoAgent");
        assert_eq!(request.kind.as_wire(), "0");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: BridgeResponse = serde_json::from_str(r#"{"data":"ok"}"#).unwrap();
        assert_eq!(response.data.as_deref(), Some("ok"));
        assert!(response.kind.is_none());
    }

    #[test]
    fn agent_list_is_split_and_trimmed() {
        assert_eq!(
            parse_agent_list("EmailAgent, TodoAgent,,"),
            vec!["EmailAgent".to_string(), "TodoAgent".to_string()]
        );
        assert!(parse_agent_list("").is_empty());
    }
}
