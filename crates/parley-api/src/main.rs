//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Reads the config file, installs tracing, resolves settings from flags,
//! environment and file, then dispatches to the requested command.

mod cli;
mod http;
mod settings;
mod state;

use clap::Parser;
use parley_infra::config::{CONFIG_FILE_NAME, config_or_default, read_config, resolve_data_dir};
use parley_observe::tracing_setup::{init_tracing, shutdown_tracing};
use parley_types::config::LogFormat;

use cli::{Cli, Commands, ServeArgs};
use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(resolve_data_dir);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));

    // The file is read before tracing exists so that its [logging] section
    // applies; problems with it are reported once the subscriber is up.
    let loaded = read_config(&config_path).await;
    let mut logging = match &loaded {
        Ok(Some(config)) => config.logging.clone(),
        _ => Default::default(),
    };
    if cli.log_json {
        logging.format = LogFormat::Json;
    }
    init_tracing(&logging, cli.verbosity()).map_err(|e| anyhow::anyhow!(e))?;

    let config = config_or_default(loaded, &config_path);

    let result = match cli.command {
        Commands::Serve(args) => {
            let settings = Settings::resolve(config, data_dir, cli.database_url, &args);
            cli::serve::serve(settings).await
        }
        Commands::Stats { json } => {
            let settings =
                Settings::resolve(config, data_dir, cli.database_url, &ServeArgs::default());
            cli::stats::stats(&settings, json).await
        }
    };

    shutdown_tracing();
    result
}
