//! Liveness and scrape endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};

use crate::metrics;
use crate::types::HealthResponse;
use crate::AppState;

/// Liveness plus the board's shape and how many requests are parked on it.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let board = &state.board;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        board: format!("{}x{}", board.rows(), board.cols()),
        blocked_flips: board.blocked_flips(),
        pending_watchers: board.pending_watchers(),
    })
}

pub async fn metrics_handler() -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")];
    (StatusCode::OK, content_type, metrics::encode_metrics())
}
