//! Chat id path parameter.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use parley_types::chat::ChatId;

use crate::http::error::AppError;

/// `{id}` segment parsed as a non-negative chat id.
///
/// Rejections use the envelope format instead of axum's plain-text body.
#[derive(Debug, Clone, Copy)]
pub struct ChatIdParam(pub ChatId);

impl<S: Send + Sync> FromRequestParts<S> for ChatIdParam {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        parse_chat_id(&raw).map(Self)
    }
}

pub fn parse_chat_id(raw: &str) -> Result<ChatId, AppError> {
    match raw.parse::<ChatId>() {
        Ok(id) if id.0 >= 0 => Ok(id),
        _ => Err(AppError::Validation(format!(
            "chat id must be a non-negative integer, got '{raw}'"
        ))),
    }
}
