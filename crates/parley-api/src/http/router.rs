//! Axum router configuration with middleware.
//!
//! All resource routes are under `/api/v1/`.
//! Middleware: per-request timeout, CORS, tracing.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use parley_types::config::ServerConfig;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chats", post(handlers::chat::create_chat))
        // Reads are also accepted as POST
        .route(
            "/chats/{id}",
            get(handlers::chat::get_chat)
                .post(handlers::chat::get_chat)
                .delete(handlers::chat::delete_chat),
        )
        .route("/chats/{id}/messages", post(handlers::message::send_message))
        // Older clients post with a trailing slash
        .route("/chats/{id}/messages/", post(handlers::message::send_message))
        .route("/stats", get(handlers::stats::get_stats));

    let router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check));

    with_request_timeout(router, server.request_timeout())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bound every request by `timeout`, answering late ones with an error envelope.
fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::map_response(timeout_envelope))
}

async fn timeout_envelope(response: Response) -> Response {
    // Handlers never answer 408 themselves; only the timeout layer does.
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return AppError::Timeout.into_response();
    }
    response
}

/// GET /health - Liveness plus a database round trip.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match sqlx::query("SELECT 1").execute(&state.db_pool.reader).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unavailable",
                    "version": env!("CARGO_PKG_VERSION"),
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_types::config::ServiceConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::cli::ServeArgs;
    use crate::settings::Settings;

    async fn test_router() -> Router {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let settings = Settings::resolve(
            ServiceConfig::default(),
            data_dir,
            None,
            &ServeArgs::default(),
        );
        let pool = DatabasePool::new(&settings.database_url).await.unwrap();
        let (state, _worker) = AppState::from_pool(pool, &settings);
        build_router(state, &settings.config.server)
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = test_router().await;
        let (status, body) = call(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chat_walkthrough_over_http() {
        let router = test_router().await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/chats",
            Some(json!({"title": "  Team Standup  "})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["title"], "Team Standup");
        assert_eq!(body["_links"]["self"], "/api/v1/chats/1");

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/chats",
            Some(json!({"title": "Team Standup"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "CHAT_ALREADY_EXISTS");

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/chats/1/messages",
            Some(json!({"text": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["data"]["chat_id"], 1);
        assert_eq!(body["data"]["text"], "hi");

        let (status, body) = call(&router, Method::GET, "/api/v1/chats/1?limit=20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["messages"][0]["text"], "hi");

        let (status, body) = call(&router, Method::POST, "/api/v1/chats/1?limit=junk", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Team Standup");

        let (status, body) = call(&router, Method::DELETE, "/api/v1/chats/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);

        let (status, body) = call(&router, Method::GET, "/api/v1/chats/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "CHAT_NOT_FOUND");
    }

    #[tokio::test]
    async fn message_to_missing_chat_is_404() {
        let router = test_router().await;
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/chats/9/messages",
            Some(json!({"text": "hello?"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn invalid_input_is_400() {
        let router = test_router().await;

        let (status, body) = call(&router, Method::POST, "/api/v1/chats", Some(json!({"title": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let long = "x".repeat(201);
        let (status, _) = call(&router, Method::POST, "/api/v1/chats", Some(json!({"title": long}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&router, Method::POST, "/api/v1/chats", Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&router, Method::GET, "/api/v1/chats/-3", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (status, _) = call(&router, Method::DELETE, "/api/v1/chats/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn message_route_accepts_trailing_slash() {
        let router = test_router().await;
        call(&router, Method::POST, "/api/v1/chats", Some(json!({"title": "slashes"}))).await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/chats/1/messages/",
            Some(json!({"text": "hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["chat_id"], 1);
    }

    #[tokio::test]
    async fn slow_request_gets_timeout_envelope() {
        let router: Router = with_request_timeout(
            Router::new().route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            ),
            Duration::from_millis(50),
        );

        let (status, body) = call(&router, Method::GET, "/slow", None).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["errors"][0]["code"], "REQUEST_TIMEOUT");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn stats_empty_before_first_collection() {
        let router = test_router().await;
        let (status, body) = call(&router, Method::GET, "/api/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["snapshot"].is_null());
    }
}
