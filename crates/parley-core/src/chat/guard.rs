//! Allow-listed existence checks against the chat store.
//!
//! Every reference to a parent chat made by a write goes through this guard
//! before the write is issued. The store has the final say through its own
//! constraints; the guard gives callers a typed answer before any mutation.

use parley_types::error::ChatError;
use parley_types::filter::{FilterParam, FilterValue};
use tracing::debug;

use crate::repository::chat::ChatRepository;

/// Existence checker over a borrowed chat repository.
pub struct ConsistencyGuard<'a, C: ChatRepository> {
    repo: &'a C,
}

impl<'a, C: ChatRepository> ConsistencyGuard<'a, C> {
    pub fn new(repo: &'a C) -> Self {
        Self { repo }
    }

    /// Whether a chat matching the predicate exists.
    pub async fn exists(&self, filter: &FilterParam) -> Result<bool, ChatError> {
        let found = self.repo.exists_where(filter).await?;
        debug!(filter = %filter, found, "existence check");
        Ok(found)
    }

    /// Same as [`exists`](Self::exists) for a free-form field name.
    ///
    /// A name outside the allow-list fails with `ChatError::InvalidFilter`
    /// and the store is never consulted.
    pub async fn exists_by_name(
        &self,
        field: &str,
        value: impl Into<FilterValue>,
    ) -> Result<bool, ChatError> {
        let filter = FilterParam::parse(field, value)?;
        self.exists(&filter).await
    }
}
