//! HTTP relay in front of the agent bridge.
//!
//! # Responsibility
//! - Accept `POST /api/agent-sync` with `{type, id, data}` and forward it to
//!   the bridge over one TCP round-trip.
//! - Map bridge failures onto the response shapes the web editor expects.
//!
//! # Invariants
//! - An unparsable bridge reply answers `200` with a synthesized error text.
//! - A transport failure answers `500 {"error": "Connection failed"}`.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use log::{info, warn};
use protocolai_core::{BridgeConfig, BridgeError, TcpAgentBridge};
use serde_json::{json, Value};
use std::io;

const PARSE_ERROR_TEXT: &str = "Error: Could not parse response.";
const CONNECTION_FAILED_TEXT: &str = "Connection failed";

#[derive(Clone)]
struct RelayState {
    bridge: TcpAgentBridge,
}

/// Builds the relay router around a bridge client.
pub fn router(bridge: BridgeConfig) -> Router {
    Router::new()
        .route("/api/agent-sync", post(agent_sync))
        .with_state(RelayState {
            bridge: TcpAgentBridge::new(bridge),
        })
}

/// Binds `listen` and serves the relay until Ctrl+C.
pub async fn serve(listen: &str, bridge: BridgeConfig) -> io::Result<()> {
    let bridge_addr = bridge.addr.clone();
    let listener = tokio::net::TcpListener::bind(listen).await?;
    let local = listener.local_addr()?;
    info!("event=relay_start module=relay status=ok listen={local} bridge={bridge_addr}");
    println!("ProtocolAI relay at http://{local} -> {bridge_addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router(bridge))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("event=relay_stop module=relay status=ok");
    Ok(())
}

async fn agent_sync(
    State(state): State<RelayState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // Only the three protocol fields are forwarded.
    let payload = json!({
        "type": body.get("type").cloned().unwrap_or(Value::Null),
        "id": body.get("id").cloned().unwrap_or(Value::Null),
        "data": body.get("data").cloned().unwrap_or(Value::Null),
    });

    match state.bridge.exchange_value(&payload).await {
        Ok(reply) => (StatusCode::OK, Json(reply)),
        Err(BridgeError::Malformed(_)) => {
            warn!("event=relay_forward module=relay status=error error_code=malformed_response");
            (
                StatusCode::OK,
                Json(json!({ "type": payload["type"], "data": PARSE_ERROR_TEXT })),
            )
        }
        Err(err) => {
            warn!("event=relay_forward module=relay status=error error={err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": CONNECTION_FAILED_TEXT })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::router;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use protocolai_core::BridgeConfig;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use tower::ServiceExt;

    /// Accepts one connection, captures the request bytes and answers `reply`.
    async fn spawn_fake_bridge(reply: &'static str) -> (SocketAddr, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0_u8; 4096];
            let read = socket.read(&mut buf).await.unwrap();
            buf.truncate(read);
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            buf
        });
        (addr, handle)
    }

    fn bridge_config(addr: SocketAddr) -> BridgeConfig {
        BridgeConfig {
            addr: addr.to_string(),
            ..BridgeConfig::default()
        }
    }

    async fn post_json(config: BridgeConfig, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/agent-sync")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router(config).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn forwards_protocol_fields_and_returns_bridge_json() {
        let (addr, bridge) = spawn_fake_bridge(r#"{"type":"1","data":"EmailAgent,TodoAgent"}"#).await;

        let (status, reply) = post_json(
            bridge_config(addr),
            json!({"type": "1", "id": "doc_first", "data": "TITLE: x\n\n", "extra": true}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({"type": "1", "data": "EmailAgent,TodoAgent"}));
        let sent: Value = serde_json::from_slice(&bridge.await.unwrap()).unwrap();
        assert_eq!(sent, json!({"type": "1", "id": "doc_first", "data": "TITLE: x\n\n"}));
    }

    #[tokio::test]
    async fn unparsable_reply_becomes_synthesized_error_text() {
        let (addr, _bridge) = spawn_fake_bridge("not json at all").await;

        let (status, reply) = post_json(
            bridge_config(addr),
            json!({"type": "0", "id": "EmailAgent", "data": "x"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            reply,
            json!({"type": "0", "data": "Error: Could not parse response."})
        );
    }

    #[tokio::test]
    async fn unreachable_bridge_answers_500() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (status, reply) = post_json(
            bridge_config(addr),
            json!({"type": "1", "id": "doc_first", "data": "x"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply, json!({"error": "Connection failed"}));
    }
}
