//! Agent bridge client contract and TCP implementation.
//!
//! # Responsibility
//! - Define the async request/response seam used by the sync and
//!   interaction engines.
//! - Speak the one-request-per-connection socket protocol of the agent
//!   process.
//!
//! # Invariants
//! - One connection per request; the connection is dropped after the reply.
//! - Socket and decode failures surface as `BridgeError`, never as panics.
//! - Payload contents are never logged.

use crate::config::{BridgeConfig, ResponseReadMode, MAX_READ_BUFFER_SIZE};
use crate::sync::protocol::{BridgeRequest, BridgeResponse};
use log::{debug, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::io;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Transport or decode failure talking to the agent bridge.
#[derive(Debug)]
pub enum BridgeError {
    /// Could not open the socket.
    Connect(io::Error),
    /// Write or read failed after connecting.
    Io(io::Error),
    /// Reply was empty or not the expected JSON shape.
    Malformed(String),
    /// Exchange exceeded the configured timeout.
    Timeout(Duration),
}

impl BridgeError {
    /// Returns whether the failure happened at the transport level.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect_failed",
            Self::Io(_) => "io_failed",
            Self::Malformed(_) => "malformed_response",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(err) => write!(f, "agent bridge connection failed: {err}"),
            Self::Io(err) => write!(f, "agent bridge i/o failed: {err}"),
            Self::Malformed(details) => write!(f, "agent bridge reply malformed: {details}"),
            Self::Timeout(after) => {
                write!(f, "agent bridge timed out after {} ms", after.as_millis())
            }
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect(err) | Self::Io(err) => Some(err),
            Self::Malformed(_) | Self::Timeout(_) => None,
        }
    }
}

/// Async request/response seam to the external agent process.
pub trait AgentBridge {
    /// Sends one request and returns the decoded reply.
    fn exchange(
        &self,
        request: &BridgeRequest,
    ) -> impl Future<Output = BridgeResult<BridgeResponse>> + Send;
}

/// TCP client for the agent process.
#[derive(Debug, Clone)]
pub struct TcpAgentBridge {
    config: BridgeConfig,
}

impl TcpAgentBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Forwards an arbitrary JSON payload and returns the reply as JSON.
    ///
    /// Used by the HTTP relay, which passes request bodies through verbatim.
    pub async fn exchange_value(&self, payload: &Value) -> BridgeResult<Value> {
        let started_at = Instant::now();
        let encoded = serde_json::to_vec(payload)
            .map_err(|err| BridgeError::Malformed(format!("request encode failed: {err}")))?;

        let result = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.round_trip(&encoded))
                .await
                .unwrap_or(Err(BridgeError::Timeout(limit))),
            None => self.round_trip(&encoded).await,
        };

        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=bridge_exchange module=sync status=error error_code={} duration_ms={} error={}",
                    err.code(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let value = serde_json::from_slice::<Value>(&raw).map_err(|err| {
            warn!(
                "event=bridge_exchange module=sync status=error error_code=malformed_response bytes={} duration_ms={}",
                raw.len(),
                started_at.elapsed().as_millis()
            );
            BridgeError::Malformed(err.to_string())
        })?;

        debug!(
            "event=bridge_exchange module=sync status=ok bytes={} duration_ms={}",
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }

    async fn round_trip(&self, encoded: &[u8]) -> BridgeResult<Vec<u8>> {
        let mut stream = TcpStream::connect(self.config.addr.as_str())
            .await
            .map_err(BridgeError::Connect)?;
        stream.write_all(encoded).await.map_err(BridgeError::Io)?;
        stream.flush().await.map_err(BridgeError::Io)?;
        read_reply(&mut stream, self.config.read_mode, self.config.read_buffer_size).await
    }
}

impl AgentBridge for TcpAgentBridge {
    async fn exchange(&self, request: &BridgeRequest) -> BridgeResult<BridgeResponse> {
        let payload = serde_json::to_value(request)
            .map_err(|err| BridgeError::Malformed(format!("request encode failed: {err}")))?;
        let reply = self.exchange_value(&payload).await?;
        serde_json::from_value(reply).map_err(|err| BridgeError::Malformed(err.to_string()))
    }
}

async fn read_reply(
    stream: &mut TcpStream,
    mode: ResponseReadMode,
    buffer_size: usize,
) -> BridgeResult<Vec<u8>> {
    let mut reply = Vec::new();
    let mut chunk = vec![0u8; buffer_size.clamp(1, MAX_READ_BUFFER_SIZE)];

    loop {
        let read = stream.read(&mut chunk).await.map_err(BridgeError::Io)?;
        if read == 0 {
            break;
        }
        reply.extend_from_slice(&chunk[..read]);

        if mode == ResponseReadMode::FirstChunk {
            break;
        }
        match serde_json::from_slice::<Value>(&reply) {
            Ok(_) => break,
            Err(err) if err.is_eof() => continue,
            // Trailing bytes or bad syntax will not be fixed by more input.
            Err(_) => break,
        }
    }

    if reply.is_empty() {
        return Err(BridgeError::Malformed("empty reply".to_string()));
    }
    Ok(reply)
}
