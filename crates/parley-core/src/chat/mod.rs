//! Chat and message operations on top of the repository ports.

pub mod guard;
pub mod service;
