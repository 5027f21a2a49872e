//! Memory Scramble Web Server
//!
//! Serves one shared board to any number of players over HTTP.
//! Endpoints (all GET, plain-text board views):
//! - /look/:player                 - Current board
//! - /flip/:player/:location       - Flip the card at `row,col`
//! - /replace/:player/:from/:to    - Rewrite every `from` card to `to`
//! - /watch/:player                - Wait for the next change, then the board
//! - /health                       - Health check (JSON)
//! - /metrics                      - Prometheus metrics

use anyhow::{Context, Result};
use axum::{http::HeaderValue, routing::get, Router};
use clap::Parser;
use scramble_core::Board;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

mod config;
mod handlers;
mod metrics;
mod types;

use config::Config;
use handlers::{flip, health, look, metrics_handler, replace, watch};

/// Shared application state
pub struct AppState {
    pub board: Board,
    /// CORS origins; empty allows any.
    pub allowed_origins: Vec<String>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Create the application router with the given state.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/look/:player", get(look))
        .route("/flip/:player/:location", get(flip))
        .route("/replace/:player/:from/:to", get(replace))
        .route("/watch/:player", get(watch))
        .layer(cors)
        .with_state(state)
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Completes when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level);
    metrics::init_metrics();

    let board = Board::from_file(&config.board_file)
        .await
        .with_context(|| format!("failed to load board {}", config.board_file.display()))?;
    info!(
        rows = board.rows(),
        cols = board.cols(),
        "Serving board {}",
        config.board_file.display()
    );
    if config.allowed_origins.is_empty() {
        warn!("No CORS origins configured, allowing any origin");
    }

    let state = Arc::new(AppState {
        board,
        allowed_origins: config.allowed_origins.clone(),
    });
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthResponse;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    /// 5x5 board, `A B A B A / B A B A B / ...` row-major.
    fn create_test_state() -> Arc<AppState> {
        metrics::init_metrics();
        let mut text = String::from("5x5\n");
        for i in 0..25 {
            text.push_str(if i % 2 == 0 { "A\n" } else { "B\n" });
        }
        Arc::new(AppState {
            board: Board::parse(&text).unwrap(),
            allowed_origins: vec![],
        })
    }

    /// Helper to make a GET request and return response body as string
    async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, String) {
        let app = create_app(Arc::clone(state));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(body.to_vec()).unwrap();
        (status, body_str)
    }

    fn line(body: &str, n: usize) -> &str {
        body.lines().nth(n).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state();
        let (status, body) = get(&state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let response: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.board, "5x5");
        assert_eq!(response.blocked_flips, 0);
        assert_eq!(response.pending_watchers, 0);
    }

    #[tokio::test]
    async fn test_health_counts_blocked_flips() {
        let state = create_test_state();
        get(&state, "/flip/alice/0,0").await;
        let blocked = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { get(&state, "/flip/bob/0,0").await })
        };
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.board.blocked_flips() == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        let (_, body) = get(&state, "/health").await;
        let response: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(response.blocked_flips, 1);
        blocked.abort();
    }

    #[tokio::test]
    async fn test_look_fresh_board() {
        let state = create_test_state();
        let (status, body) = get(&state, "/look/alice").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(line(&body, 0), "5x5");
        assert_eq!(body.lines().count(), 26);
        assert!(body.lines().skip(1).all(|l| l == "down"));
    }

    #[tokio::test]
    async fn test_flip_is_player_relative() {
        let state = create_test_state();
        let (status, body) = get(&state, "/flip/alice/0,0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line(&body, 1), "my A");

        let (_, body) = get(&state, "/look/bob").await;
        assert_eq!(line(&body, 1), "up A");
    }

    #[tokio::test]
    async fn test_flip_rejects_bad_requests() {
        let state = create_test_state();

        let (status, body) = get(&state, "/flip/alice/0-0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid location format");

        let (status, _) = get(&state, "/flip/alice/-1,0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(&state, "/flip/al%20ice/0,0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid player id"));
    }

    #[tokio::test]
    async fn test_flip_failures_are_conflicts() {
        let state = create_test_state();

        let (status, body) = get(&state, "/flip/alice/5,0").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.starts_with("cannot flip this card: "), "{}", body);
        assert!(body.contains("out of bounds"));

        get(&state, "/flip/alice/0,0").await;
        get(&state, "/flip/bob/0,2").await;
        let (status, body) = get(&state, "/flip/bob/0,0").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("controlled"), "{}", body);
    }

    #[tokio::test]
    async fn test_blocked_flip_completes_when_released() {
        let state = create_test_state();
        get(&state, "/flip/alice/0,0").await;

        let waiting = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { get(&state, "/flip/bob/0,0").await })
        };
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.board.blocked_flips() == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        // Mismatch hands (0, 0) over to bob.
        let (status, _) = get(&state, "/flip/alice/0,1").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line(&body, 1), "my A");
    }

    #[tokio::test]
    async fn test_replace() {
        let state = create_test_state();
        get(&state, "/flip/alice/0,1").await;

        let (status, body) = get(&state, "/replace/alice/B/%F0%9F%8C%88").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line(&body, 2), "my 🌈");

        let (status, _) = get(&state, "/replace/alice/A/a%20b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_watch_returns_after_change() {
        let state = create_test_state();
        let watching = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { get(&state, "/watch/carol").await })
        };
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.board.pending_watchers() == 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();

        get(&state, "/flip/alice/2,2").await;
        let (status, body) = tokio::time::timeout(Duration::from_secs(5), watching)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(line(&body, 13), "up A");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = create_test_state();
        get(&state, "/flip/alice/0,0").await;

        let (status, body) = get(&state, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("scramble_flips_total"));
        assert!(body.contains("scramble_request_duration_seconds"));
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let _ = cors_layer(&["http://localhost:5173".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&[]);
    }
}
