//! Configuration loader for Parley.
//!
//! Reads `config.toml` and deserializes it into [`ServiceConfig`]. Falls back
//! to defaults when the file is missing or malformed. Command-line flags and
//! environment variables are layered on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parley_types::config::{DEFAULT_METRICS_INTERVAL_SECS, ServiceConfig};

/// Name of the config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory.
///
/// `PARLEY_DATA_DIR` if set, otherwise `~/.parley`, otherwise `./.parley`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    PathBuf::from(".parley")
}

/// SQLite URL for the database file inside `data_dir`.
pub fn default_database_url(data_dir: &Path) -> String {
    format!("sqlite://{}/parley.db?mode=rwc", data_dir.display())
}

/// Errors reading `config.toml`. A missing file is not an error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse `config_path` without logging.
///
/// Returns `Ok(None)` when the file does not exist. The binary calls this
/// before the tracing subscriber is installed, then reports the outcome
/// through [`config_or_default`].
pub async fn read_config(config_path: &Path) -> Result<Option<ServiceConfig>, ConfigError> {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str::<ServiceConfig>(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
}

/// Turn the outcome of [`read_config`] into a usable config.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: warning, then defaults.
pub fn config_or_default(
    loaded: Result<Option<ServiceConfig>, ConfigError>,
    config_path: &Path,
) -> ServiceConfig {
    match loaded {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config found at {}, using defaults", config_path.display());
            ServiceConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            ServiceConfig::default()
        }
    }
}

/// Load configuration from `config_path`, falling back to defaults.
pub async fn load_config(config_path: &Path) -> ServiceConfig {
    config_or_default(read_config(config_path).await, config_path)
}

/// Resolve the metrics interval from a raw override such as `PARLEY_METRICS_INTERVAL`.
///
/// No override keeps `fallback`. An override that is not a positive whole
/// number of seconds is logged and replaced by the 15 second default.
pub fn resolve_metrics_interval(raw: Option<&str>, fallback: Duration) -> Duration {
    let Some(raw) = raw else {
        return fallback;
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                value = raw,
                default_secs = DEFAULT_METRICS_INTERVAL_SECS,
                "invalid metrics interval, using default"
            );
            Duration::from_secs(DEFAULT_METRICS_INTERVAL_SECS)
        }
    }
}
