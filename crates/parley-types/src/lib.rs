//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley service:
//! Chat, Message, the existence-check filter predicate, metrics snapshots,
//! service configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
