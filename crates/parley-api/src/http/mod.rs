//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format,
//! a per-request deadline, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
