//! Application configuration model.
//!
//! Loaded from `config.toml` by `penguin-infrastructure::ConfigService`.
//! Every section has defaults, so an empty or missing file is valid.

use serde::{Deserialize, Serialize};

/// Default public origin used to build share URLs.
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:8080";
/// Default gateway timeout in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;

/// Which assistant backend adapter to build.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// POST to an HTTP endpoint.
    Http,
    /// Canned local replies, no network.
    #[default]
    Simulated,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    /// Endpoint URL for the HTTP gateway.
    pub endpoint: Option<String>,
    /// Bearer token sent with each request, if any.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Artificial reply delay of the simulated gateway, in milliseconds.
    pub simulated_delay_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::default(),
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
            simulated_delay_ms: 1500,
        }
    }
}

/// Where shared snapshots are kept.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShareStorageKind {
    /// Lost when the process exits.
    Memory,
    /// One file per snapshot under the data directory.
    #[default]
    Directory,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ShareConfig {
    pub origin: String,
    pub storage: ShareStorageKind,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_SHARE_ORIGIN.to_string(),
            storage: ShareStorageKind::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PenguinConfig {
    pub gateway: GatewayConfig,
    pub share: ShareConfig,
    pub logging: LoggingConfig,
}
