//! Chat and message types for Parley.
//!
//! A chat is a titled conversation; messages belong to exactly one chat.
//! Identifiers and timestamps are assigned by the store at insert time and
//! never change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Maximum chat title length, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum message text length, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Number of messages returned with a chat when no usable limit is given.
pub const DEFAULT_MESSAGE_LIMIT: i64 = 20;

/// Store-assigned chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Store-assigned message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A titled conversation.
///
/// `messages` is only populated by reads that explicitly load them; it is
/// never persisted as part of the chat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A single message within a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a chat.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatRequest {
    pub title: String,
}

impl CreateChatRequest {
    /// Trim and validate the title, returning the normalized value.
    pub fn validate(&self) -> Result<String, ValidationError> {
        validate_title(&self.title)
    }
}

/// Request body for sending a message to a chat.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

impl SendMessageRequest {
    /// Trim and validate the text, returning the normalized value.
    pub fn validate(&self) -> Result<String, ValidationError> {
        validate_text(&self.text)
    }
}

/// Trim a chat title and check it is non-empty and at most 200 characters.
pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    validate_bounded("title", raw, MAX_TITLE_CHARS)
}

/// Trim message text and check it is non-empty and at most 5000 characters.
pub fn validate_text(raw: &str) -> Result<String, ValidationError> {
    validate_bounded("text", raw, MAX_TEXT_CHARS)
}

fn validate_bounded(
    field: &'static str,
    raw: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max: max_chars,
            actual: len,
        });
    }
    Ok(trimmed.to_string())
}

/// Number of messages to load alongside a chat.
///
/// Missing, zero, or negative requests fall back to [`DEFAULT_MESSAGE_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimit(i64);

impl MessageLimit {
    pub fn resolve(requested: Option<i64>) -> Self {
        match requested {
            Some(n) if n > 0 => Self(n),
            _ => Self(DEFAULT_MESSAGE_LIMIT),
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for MessageLimit {
    fn default() -> Self {
        Self(DEFAULT_MESSAGE_LIMIT)
    }
}
