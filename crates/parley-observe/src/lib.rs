//! Observability bootstrap for Parley: tracing subscriber and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
