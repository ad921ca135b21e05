//! Effective runtime settings.
//!
//! Merges `config.toml` with command-line and environment overrides into one
//! value that is passed down explicitly; nothing reads configuration globally.

use std::path::PathBuf;
use std::time::Duration;

use parley_infra::config::{default_database_url, resolve_metrics_interval};
use parley_types::config::ServiceConfig;

use crate::cli::ServeArgs;

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: ServiceConfig,
    pub data_dir: PathBuf,
    pub database_url: String,
    pub metrics_interval: Duration,
}

impl Settings {
    /// Apply overrides on top of the file config.
    ///
    /// Database URL: flag/env, then `[database] url`, then `<data_dir>/parley.db`.
    pub fn resolve(
        mut config: ServiceConfig,
        data_dir: PathBuf,
        database_url: Option<String>,
        serve: &ServeArgs,
    ) -> Self {
        if let Some(host) = &serve.host {
            config.server.host = host.clone();
        }
        if let Some(port) = serve.port {
            config.server.port = port;
        }

        let database_url = database_url
            .or_else(|| config.database.url.clone())
            .unwrap_or_else(|| default_database_url(&data_dir));

        let metrics_interval = resolve_metrics_interval(
            serve.metrics_interval.as_deref(),
            config.workers.metrics_interval(),
        );

        Self {
            config,
            data_dir,
            database_url,
            metrics_interval,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}
