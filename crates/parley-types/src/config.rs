//! Service configuration types for Parley.
//!
//! `ServiceConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty or missing file yields a working config.

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Metrics poll interval used when the configured value is missing or unusable.
pub const DEFAULT_METRICS_INTERVAL_SECS: u64 = 15;

/// Top-level configuration for the Parley service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub workers: WorkerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request deadline enforced by the HTTP middleware.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on graceful HTTP shutdown after workers have drained.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    2
}

fn default_shutdown_timeout_secs() -> u64 {
    25
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Background worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,

    /// How long shutdown waits for background tasks before giving up.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

fn default_metrics_interval_secs() -> u64 {
    DEFAULT_METRICS_INTERVAL_SECS
}

fn default_drain_timeout_secs() -> u64 {
    10
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            metrics_interval_secs: default_metrics_interval_secs(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl WorkerConfig {
    /// Metrics poll interval. Zero is not a usable period and maps to the default.
    pub fn metrics_interval(&self) -> Duration {
        match self.metrics_interval_secs {
            0 => Duration::from_secs(DEFAULT_METRICS_INTERVAL_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

/// Database location. `None` means `{data_dir}/parley.db`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}
