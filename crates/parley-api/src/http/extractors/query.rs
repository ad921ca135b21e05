//! Query parameter extractors.

use serde::Deserialize;

/// Query parameters for reading a chat.
#[derive(Debug, Deserialize, Default)]
pub struct ChatQuery {
    /// Number of newest messages to include. Kept as text so that an
    /// unparsable value falls back to the default instead of failing.
    pub limit: Option<String>,
}

impl ChatQuery {
    /// The limit if it parses as an integer; range checks happen in the service.
    pub fn requested_limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}
