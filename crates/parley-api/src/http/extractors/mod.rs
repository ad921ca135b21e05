//! Request extractors shared by the handlers.

pub mod path;
pub mod query;
