//! Runtime configuration for the editor core.
//!
//! # Responsibility
//! - Hold bridge endpoint, timer and socket-read settings with defaults.
//! - Apply `PROTOCOLAI_*` environment overrides with validation.
//!
//! # Invariants
//! - Defaults reproduce the behavior the agent service was built against,
//!   except for the response read mode (see [`ResponseReadMode`]).
//! - Invalid overrides are rejected, never silently ignored.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_BRIDGE_ADDR: &str = "127.0.0.1:65432";
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(5000);
pub const DEFAULT_RECOMMENDATION_TTL: Duration = Duration::from_millis(10_000);
pub const DEFAULT_READ_BUFFER_SIZE: usize = 10_000;
/// Upper bound for the per-read buffer (16 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 16 * 1024 * 1024;

pub const ENV_BRIDGE_ADDR: &str = "PROTOCOLAI_BRIDGE_ADDR";
pub const ENV_READ_MODE: &str = "PROTOCOLAI_READ_MODE";
pub const ENV_READ_BUFFER_SIZE: &str = "PROTOCOLAI_READ_BUFFER_SIZE";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PROTOCOLAI_REQUEST_TIMEOUT_MS";

/// How the bridge client decides a response is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseReadMode {
    /// Treat the first received chunk as the whole response.
    ///
    /// Truncates replies larger than one read.
    FirstChunk,
    /// Keep reading until the buffered bytes parse as one JSON value or the
    /// peer closes.
    UntilComplete,
}

impl ResponseReadMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_chunk" | "first-chunk" => Ok(Self::FirstChunk),
            "until_complete" | "until-complete" => Ok(Self::UntilComplete),
            other => Err(ConfigError::InvalidValue {
                key: ENV_READ_MODE,
                value: other.to_string(),
                expected: "first_chunk|until_complete",
            }),
        }
    }
}

/// Agent bridge connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// `host:port` of the agent process.
    pub addr: String,
    pub read_mode: ResponseReadMode,
    /// Size of each socket read.
    pub read_buffer_size: usize,
    /// Whole-exchange timeout. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_BRIDGE_ADDR.to_string(),
            read_mode: ResponseReadMode::UntilComplete,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            request_timeout: None,
        }
    }
}

/// Full editor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub bridge: BridgeConfig,
    /// Lifetime of each toast.
    pub toast_ttl: Duration,
    /// Lifetime of an unanswered recommendation overlay.
    pub recommendation_ttl: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            toast_ttl: DEFAULT_TOAST_TTL,
            recommendation_ttl: DEFAULT_RECOMMENDATION_TTL,
        }
    }
}

impl EditorConfig {
    /// Builds a config from defaults plus process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults plus overrides from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_BRIDGE_ADDR) {
            config.bridge.addr = normalize_addr(&addr)?;
        }
        if let Some(mode) = lookup(ENV_READ_MODE) {
            config.bridge.read_mode = ResponseReadMode::parse(&mode)?;
        }
        if let Some(size) = lookup(ENV_READ_BUFFER_SIZE) {
            let parsed = parse_positive(ENV_READ_BUFFER_SIZE, &size)?;
            config.bridge.read_buffer_size = usize::try_from(parsed)
                .ok()
                .filter(|bytes| *bytes <= MAX_READ_BUFFER_SIZE)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_READ_BUFFER_SIZE,
                    value: size.trim().to_string(),
                    expected: "a positive integer up to 16777216",
                })?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            let millis = parse_positive(ENV_REQUEST_TIMEOUT_MS, &timeout)?;
            config.bridge.request_timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

fn normalize_addr(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    match trimmed.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
            Ok(trimmed.to_string())
        }
        _ => Err(ConfigError::InvalidValue {
            key: ENV_BRIDGE_ADDR,
            value: trimmed.to_string(),
            expected: "host:port",
        }),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.trim().to_string(),
            expected: "a positive integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EditorConfig, ResponseReadMode};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_agent_service_contract() {
        let config = EditorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bridge.addr, "127.0.0.1:65432");
        assert_eq!(config.toast_ttl, Duration::from_millis(5000));
        assert_eq!(config.recommendation_ttl, Duration::from_millis(10_000));
        assert_eq!(config.bridge.read_mode, ResponseReadMode::UntilComplete);
        assert!(config.bridge.request_timeout.is_none());
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = EditorConfig::from_lookup(lookup(&[
            ("PROTOCOLAI_BRIDGE_ADDR", " localhost:7000 "),
            ("PROTOCOLAI_READ_MODE", "FIRST_CHUNK"),
            ("PROTOCOLAI_READ_BUFFER_SIZE", "1024"),
            ("PROTOCOLAI_REQUEST_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.bridge.addr, "localhost:7000");
        assert_eq!(config.bridge.read_mode, ResponseReadMode::FirstChunk);
        assert_eq!(config.bridge.read_buffer_size, 1024);
        assert_eq!(config.bridge.request_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let err = EditorConfig::from_lookup(lookup(&[("PROTOCOLAI_BRIDGE_ADDR", "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = EditorConfig::from_lookup(lookup(&[("PROTOCOLAI_READ_BUFFER_SIZE", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("PROTOCOLAI_READ_BUFFER_SIZE"));
    }

    #[test]
    fn oversized_read_buffer_is_rejected() {
        let at_cap = EditorConfig::from_lookup(lookup(&[("PROTOCOLAI_READ_BUFFER_SIZE", "16777216")]))
            .unwrap();
        assert_eq!(at_cap.bridge.read_buffer_size, super::MAX_READ_BUFFER_SIZE);

        for value in ["16777217", "18446744073709551615"] {
            let err = EditorConfig::from_lookup(lookup(&[("PROTOCOLAI_READ_BUFFER_SIZE", value)]))
                .unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: "PROTOCOLAI_READ_BUFFER_SIZE",
                    value: value.to_string(),
                    expected: "a positive integer up to 16777216",
                }
            );
        }
    }
}
