//! Chat handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Serialize;

use parley_types::chat::{Chat, ChatId, CreateChatRequest};

use crate::http::error::AppError;
use crate::http::extractors::path::ChatIdParam;
use crate::http::extractors::query::ChatQuery;
use crate::http::response::{ApiResponse, new_request_id};
use crate::state::AppState;

/// POST /api/v1/chats - Create a chat with a unique title.
pub async fn create_chat(
    State(state): State<AppState>,
    payload: Result<Json<CreateChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Chat>>), AppError> {
    let start = Instant::now();
    let request_id = new_request_id();

    let Json(body) = payload?;
    let title = body.validate()?;

    let chat = state.chat_service.create_chat(&title).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let self_link = format!("/api/v1/chats/{}", chat.id);
    let messages_link = format!("/api/v1/chats/{}/messages", chat.id);
    let resp = ApiResponse::success(chat, request_id, elapsed)
        .with_link("self", self_link)
        .with_link("messages", messages_link);

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/chats/{id}?limit=N - A chat with its newest messages.
pub async fn get_chat(
    State(state): State<AppState>,
    ChatIdParam(id): ChatIdParam,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Chat>>, AppError> {
    let start = Instant::now();
    let request_id = new_request_id();

    let Query(query) = query?;
    let chat = state
        .chat_service
        .get_chat_by_id(id, query.requested_limit())
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(chat, request_id, elapsed)
        .with_link("self", format!("/api/v1/chats/{id}"));

    Ok(Json(resp))
}

#[derive(Debug, Serialize)]
pub struct DeletedChat {
    pub id: ChatId,
    pub deleted: bool,
}

/// DELETE /api/v1/chats/{id} - Delete a chat and all of its messages.
pub async fn delete_chat(
    State(state): State<AppState>,
    ChatIdParam(id): ChatIdParam,
) -> Result<Json<ApiResponse<DeletedChat>>, AppError> {
    let start = Instant::now();
    let request_id = new_request_id();

    state.chat_service.delete_chat_by_id(id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        DeletedChat { id, deleted: true },
        request_id,
        elapsed,
    )))
}
