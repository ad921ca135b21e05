//! REST API request handlers.

pub mod chat;
pub mod message;
pub mod stats;
