//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use parley_types::error::{ChatError, ErrorKind, ValidationError};

use crate::http::response::{ApiResponse, new_request_id};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat service errors.
    Chat(ChatError),
    /// Malformed or invalid input.
    Validation(String),
    /// The request outlived the per-request deadline.
    Timeout,
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(e) => match e.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", e.to_string()),
                ErrorKind::AlreadyExists => {
                    (StatusCode::BAD_REQUEST, "CHAT_ALREADY_EXISTS", e.to_string())
                }
                ErrorKind::InvalidFilterField => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_FILTER_FIELD",
                    "internal server error".to_string(),
                ),
                ErrorKind::StoreFailure => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_FAILURE",
                    "internal server error".to_string(),
                ),
            },
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                "request timed out".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = ?self, "request failed");
        } else {
            tracing::warn!(code, %message, "request rejected");
        }

        let body = ApiResponse::error(code, &message, new_request_id());
        (status, Json(body)).into_response()
    }
}
