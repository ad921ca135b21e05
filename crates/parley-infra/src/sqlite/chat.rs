//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools, raw queries and a private row struct.

use parley_core::repository::chat::ChatRepository;
use parley_types::chat::{Chat, ChatId};
use parley_types::error::RepositoryError;
use parley_types::filter::{FilterParam, FilterValue};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, now, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: i64,
    title: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: ChatId(self.id),
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            messages: Vec::new(),
        })
    }
}

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, title: &str) -> Result<Chat, RepositoryError> {
        let created_at = now();

        let result = sqlx::query("INSERT INTO chats (title, created_at) VALUES (?, ?)")
            .bind(title)
            .bind(format_datetime(&created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(done) => Ok(Chat {
                id: ChatId(done.last_insert_rowid()),
                title: title.to_string(),
                created_at,
                messages: Vec::new(),
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("title '{title}' already exists")),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn find_chat_by_id(&self, id: ChatId) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT id, title, created_at FROM chats WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn delete_chat(&self, id: ChatId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn exists_where(&self, filter: &FilterParam) -> Result<bool, RepositoryError> {
        // The column name comes from the closed FilterField enum; only the
        // value is caller-supplied and it is always bound.
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM chats WHERE {} = ?) AS found",
            filter.field().column()
        );

        let query = sqlx::query(&sql);
        let query = match filter.value() {
            FilterValue::Int(v) => query.bind(*v),
            FilterValue::Text(v) => query.bind(v.as_str()),
            FilterValue::Timestamp(v) => query.bind(format_datetime(v)),
        };

        let row = query
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let found: i64 = row
            .try_get("found")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(found != 0)
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}
