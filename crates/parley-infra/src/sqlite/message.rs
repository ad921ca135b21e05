//! SQLite message repository implementation.

use parley_core::repository::message::MessageRepository;
use parley_types::chat::{ChatId, Message, MessageId};
use parley_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, now, parse_datetime, query_error};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: i64,
    chat_id: i64,
    text: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: MessageId(self.id),
            chat_id: ChatId(self.chat_id),
            text: self.text,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl MessageRepository for SqliteMessageRepository {
    async fn create_message(&self, chat_id: ChatId, text: &str) -> Result<Message, RepositoryError> {
        let created_at = now();

        let result = sqlx::query("INSERT INTO messages (chat_id, text, created_at) VALUES (?, ?, ?)")
            .bind(chat_id.0)
            .bind(text)
            .bind(format_datetime(&created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(done) => Ok(Message {
                id: MessageId(done.last_insert_rowid()),
                chat_id,
                text: text.to_string(),
                created_at,
            }),
            // Parent chat vanished between the existence check and the insert
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(query_error(e)),
        }
    }

    async fn list_messages(&self, chat_id: ChatId, limit: i64) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, chat_id, text, created_at FROM messages
               WHERE chat_id = ?
               ORDER BY created_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(chat_id.0)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}
