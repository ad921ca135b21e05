//! Chat service enforcing parent-existence checks before writes.
//!
//! ChatService coordinates the chat and message repositories. Every mutation
//! that references a chat first proves the chat exists through the
//! [`ConsistencyGuard`], and store-level absence is mapped to domain errors
//! (`ChatNotFound`, `ChatAlreadyExists`) so callers never see raw store misses.
//!
//! The check and the write are two separate store calls, so concurrent callers
//! can interleave between them. The SQLite store closes that gap with a unique
//! index on titles and a cascading foreign key on messages; constraint
//! violations come back as the same domain errors.

use parley_types::chat::{Chat, ChatId, Message, MessageLimit};
use parley_types::error::{ChatError, RepositoryError};
use parley_types::filter::FilterParam;
use tracing::{debug, error, info};

use crate::chat::guard::ConsistencyGuard;
use crate::repository::chat::ChatRepository;
use crate::repository::message::MessageRepository;

/// Orchestrates chat and message operations.
///
/// Generic over `ChatRepository` and `MessageRepository` to maintain
/// clean architecture (parley-core never depends on parley-infra).
pub struct ChatService<C: ChatRepository, M: MessageRepository> {
    chat_repo: C,
    message_repo: M,
}

impl<C: ChatRepository, M: MessageRepository> ChatService<C, M> {
    /// Create a new chat service with the given repositories.
    pub fn new(chat_repo: C, message_repo: M) -> Self {
        Self {
            chat_repo,
            message_repo,
        }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    /// Access the message repository.
    pub fn message_repo(&self) -> &M {
        &self.message_repo
    }

    fn guard(&self) -> ConsistencyGuard<'_, C> {
        ConsistencyGuard::new(&self.chat_repo)
    }

    /// Whether a chat matching the predicate exists.
    pub async fn chat_exists(&self, filter: &FilterParam) -> Result<bool, ChatError> {
        self.guard().exists(filter).await
    }

    /// Create a chat with a title no other chat has.
    ///
    /// The title is expected to be validated already (see
    /// `parley_types::chat::validate_title`).
    pub async fn create_chat(&self, title: &str) -> Result<Chat, ChatError> {
        if self.guard().exists(&FilterParam::by_title(title)).await? {
            debug!(title, "rejecting duplicate chat title");
            return Err(ChatError::ChatAlreadyExists(title.to_string()));
        }

        let chat = self
            .chat_repo
            .create_chat(title)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ChatError::ChatAlreadyExists(title.to_string()),
                other => {
                    error!(title, error = %other, "failed to create chat");
                    ChatError::Store(other)
                }
            })?;

        info!(chat_id = %chat.id, "chat created");
        Ok(chat)
    }

    /// Get a chat with up to `limit` of its newest messages.
    ///
    /// A missing, zero, or negative limit loads the default number of messages.
    pub async fn get_chat_by_id(&self, id: ChatId, limit: Option<i64>) -> Result<Chat, ChatError> {
        let mut chat = self
            .chat_repo
            .find_chat_by_id(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ChatError::ChatNotFound(id),
                other => ChatError::Store(other),
            })?
            .ok_or(ChatError::ChatNotFound(id))?;

        let limit = MessageLimit::resolve(limit);
        chat.messages = self.message_repo.list_messages(id, limit.get()).await?;

        Ok(chat)
    }

    /// Delete a chat. Its messages go with it through the store's cascade.
    pub async fn delete_chat_by_id(&self, id: ChatId) -> Result<(), ChatError> {
        if !self.guard().exists(&FilterParam::by_id(id)).await? {
            return Err(ChatError::ChatNotFound(id));
        }

        self.chat_repo.delete_chat(id).await.map_err(|e| match e {
            RepositoryError::NotFound => ChatError::ChatNotFound(id),
            other => {
                error!(chat_id = %id, error = %other, "failed to delete chat");
                ChatError::Store(other)
            }
        })?;

        info!(chat_id = %id, "chat deleted");
        Ok(())
    }

    /// Append a message to an existing chat.
    ///
    /// The text is expected to be validated already (see
    /// `parley_types::chat::validate_text`).
    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<Message, ChatError> {
        if !self.guard().exists(&FilterParam::by_id(chat_id)).await? {
            return Err(ChatError::ChatNotFound(chat_id));
        }

        let message = self
            .message_repo
            .create_message(chat_id, text)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ChatError::ChatNotFound(chat_id),
                other => {
                    error!(chat_id = %chat_id, error = %other, "failed to create message");
                    ChatError::Store(other)
                }
            })?;

        debug!(chat_id = %chat_id, message_id = %message.id, "message stored");
        Ok(message)
    }
}
