//! Infrastructure layer for Parley.
//!
//! Contains implementations of the repository traits defined in `parley-core`
//! (SQLite storage) and the loader that turns `config.toml` plus environment
//! overrides into a [`ServiceConfig`](parley_types::config::ServiceConfig).

pub mod config;
pub mod sqlite;
