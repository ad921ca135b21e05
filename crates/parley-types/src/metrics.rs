//! Entity counters published by the metrics worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time totals of stored chats and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub chats_total: u64,
    pub messages_total: u64,
    pub collected_at: DateTime<Utc>,
}
