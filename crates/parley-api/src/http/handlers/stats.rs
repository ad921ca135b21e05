//! Entity statistics endpoint.
//!
//! GET /api/v1/stats - Latest totals published by the metrics worker.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use parley_types::metrics::MetricsSnapshot;

use crate::http::response::{ApiResponse, new_request_id};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsBody {
    /// `None` until the worker has completed its first collection.
    pub snapshot: Option<MetricsSnapshot>,
}

/// GET /api/v1/stats - Latest metrics snapshot.
///
/// Reads the watch channel only; no store query happens on this path.
pub async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<StatsBody>> {
    let start = Instant::now();
    let request_id = new_request_id();

    let snapshot = *state.metrics.borrow();
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(StatsBody { snapshot }, request_id, elapsed)
        .with_link("self", "/api/v1/stats");

    Json(resp)
}
