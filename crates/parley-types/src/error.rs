use thiserror::Error;

use crate::chat::ChatId;

/// Coarse error classification exposed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidFilterField,
    StoreFailure,
}

/// Errors from chat and message service operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    #[error("chat titled '{0}' already exists")]
    ChatAlreadyExists(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::ChatNotFound(_) => ErrorKind::NotFound,
            ChatError::ChatAlreadyExists(_) => ErrorKind::AlreadyExists,
            ChatError::InvalidFilter(_) => ErrorKind::InvalidFilterField,
            ChatError::Store(_) => ErrorKind::StoreFailure,
        }
    }
}

/// Errors from building an existence-check filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("field '{0}' is not allowed in filters")]
    UnknownField(String),

    #[error("field '{field}' expects a {expected} value")]
    ValueMismatch {
        field: String,
        expected: &'static str,
    },
}

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Request payload validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long ({actual} characters, {max} maximum)")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Errors from background task lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    #[error("lifecycle is shutting down; no new tasks accepted")]
    ShuttingDown,
}
