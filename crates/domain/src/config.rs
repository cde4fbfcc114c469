//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKEND_PORT, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_ORIGIN, HEALTH_POLL_INTERVAL_SECS,
    HEALTH_PROBE_TIMEOUT_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Explicit API base; wins over origin-derived resolution when set.
    pub base_url: Option<String>,
    /// Origin the client is served from (scheme, host and port).
    pub origin: String,
    /// Port used for the backend when the origin is a local or private host.
    pub backend_port: u16,
    pub timeout_seconds: u64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file holding the persisted session keys. `None` keeps the
    /// session in memory only.
    pub storage_path: Option<String>,
}

/// Backend health polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            origin: DEFAULT_ORIGIN.to_string(),
            backend_port: DEFAULT_BACKEND_PORT,
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: HEALTH_POLL_INTERVAL_SECS,
            timeout_seconds: HEALTH_PROBE_TIMEOUT_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
