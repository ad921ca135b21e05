//! Chat repository trait definition.

use parley_types::chat::{Chat, ChatId};
use parley_types::error::RepositoryError;
use parley_types::filter::FilterParam;

/// Repository trait for chat persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ChatRepository: Send + Sync {
    /// Insert a chat. The store assigns `id` and `created_at`.
    ///
    /// A store that enforces title uniqueness reports a duplicate as
    /// `RepositoryError::Conflict`.
    fn create_chat(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat by ID, without its messages.
    fn find_chat_by_id(
        &self,
        id: ChatId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Delete a chat. Messages are removed by the store's cascade.
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted.
    fn delete_chat(
        &self,
        id: ChatId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Whether at least one chat matches the predicate.
    fn exists_where(
        &self,
        filter: &FilterParam,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Total number of chats.
    fn count_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
