//! Message repository trait definition.

use parley_types::chat::{ChatId, Message};
use parley_types::error::RepositoryError;

/// Repository trait for message persistence.
pub trait MessageRepository: Send + Sync {
    /// Insert a message into a chat. The store assigns `id` and `created_at`.
    ///
    /// A store with a foreign key on `chat_id` reports a missing chat as
    /// `RepositoryError::NotFound`.
    fn create_message(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Up to `limit` messages of a chat, newest first.
    fn list_messages(
        &self,
        chat_id: ChatId,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Total number of messages across all chats.
    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
