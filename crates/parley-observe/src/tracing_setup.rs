//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use parley_types::config::LoggingConfig;
//!
//! parley_observe::tracing_setup::init_tracing(&LoggingConfig::default(), 1).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use parley_types::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Filter directive for a verbosity level.
///
/// `-1` is `--quiet`, `0` the default, each `-v` adds one.
pub fn verbosity_directive(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "error",
        0 => "info",
        1 => "info,parley=debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: i8) -> EnvFilter {
    // RUST_LOG wins over the command-line verbosity
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbosity)))
}

fn fmt_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    }
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer in pretty or JSON form per `config.format`.
/// - When `config.otel` is set, additionally bridges spans to OpenTelemetry
///   using a stdout exporter.
/// - `RUST_LOG` overrides `verbosity` when present.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(
    config: &LoggingConfig,
    verbosity: i8,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut layers = vec![fmt_layer(config.format)];

    if config.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("parley");
        layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter(verbosity))
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_directive(-1), "error");
        assert_eq!(verbosity_directive(0), "info");
        assert_eq!(verbosity_directive(1), "info,parley=debug");
        assert_eq!(verbosity_directive(3), "trace");
    }

    #[test]
    fn second_init_is_an_error() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            otel: false,
        };
        let _ = init_tracing(&config, 0);
        assert!(init_tracing(&config, 0).is_err());
    }
}
