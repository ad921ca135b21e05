//! Message handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use parley_types::chat::{Message, SendMessageRequest};

use crate::http::error::AppError;
use crate::http::extractors::path::ChatIdParam;
use crate::http::response::{ApiResponse, new_request_id};
use crate::state::AppState;

/// POST /api/v1/chats/{id}/messages - Append a message to an existing chat.
pub async fn send_message(
    State(state): State<AppState>,
    ChatIdParam(chat_id): ChatIdParam,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), AppError> {
    let start = Instant::now();
    let request_id = new_request_id();

    let Json(body) = payload?;
    let text = body.validate()?;

    let message = state.chat_service.send_message(chat_id, &text).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(message, request_id, elapsed)
        .with_link("chat", format!("/api/v1/chats/{chat_id}"));

    Ok((StatusCode::CREATED, Json(resp)))
}
