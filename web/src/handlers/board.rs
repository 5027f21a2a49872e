//! Board handlers. Every successful response is the board as the requesting
//! player sees it, in plain text.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use scramble_core::BoardError;
use std::sync::Arc;
use tracing::{debug, error};

use crate::metrics::{InFlight, FLIPS, LOOKS, REPLACES, REQUEST_LATENCY, WATCHES};
use crate::types::{Location, PlayerId};
use crate::AppState;

type BoardResponse = Result<String, (StatusCode, String)>;

fn parse_player(raw: &str) -> Result<PlayerId, (StatusCode, String)> {
    raw.parse().map_err(|e| (StatusCode::BAD_REQUEST, e))
}

fn flip_outcome(err: &BoardError) -> &'static str {
    match err {
        BoardError::NoCard { .. } => "no_card",
        BoardError::Controlled { .. } => "controlled",
        BoardError::OutOfBounds { .. } => "out_of_bounds",
        _ => "error",
    }
}

/// Current board state.
pub async fn look(State(state): State<Arc<AppState>>, Path(player): Path<String>) -> BoardResponse {
    let _timer = REQUEST_LATENCY.with_label_values(&["look"]).start_timer();
    let player = parse_player(&player)?;
    LOOKS.inc();
    Ok(state.board.look(player.as_str()))
}

/// Flip a card; may wait while another player holds it.
pub async fn flip(
    State(state): State<Arc<AppState>>,
    Path((player, location)): Path<(String, String)>,
) -> BoardResponse {
    let _timer = REQUEST_LATENCY.with_label_values(&["flip"]).start_timer();
    let player = parse_player(&player)?;
    let location: Location = location
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let _in_flight = InFlight::start();
    match state
        .board
        .flip(player.as_str(), location.row, location.col)
        .await
    {
        Ok(view) => {
            FLIPS.with_label_values(&["ok"]).inc();
            Ok(view)
        }
        Err(err) if err.is_flip_failure() => {
            FLIPS.with_label_values(&[flip_outcome(&err)]).inc();
            debug!(player = player.as_str(), %err, "flip rejected");
            Err((
                StatusCode::CONFLICT,
                format!("cannot flip this card: {}", err),
            ))
        }
        Err(err) => {
            FLIPS.with_label_values(&[flip_outcome(&err)]).inc();
            error!(player = player.as_str(), %err, "flip failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

/// Replace every `from` card with `to`.
pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path((player, from, to)): Path<(String, String, String)>,
) -> BoardResponse {
    let _timer = REQUEST_LATENCY.with_label_values(&["replace"]).start_timer();
    let player = parse_player(&player)?;
    match state.board.replace(player.as_str(), &from, &to).await {
        Ok(view) => {
            REPLACES.inc();
            Ok(view)
        }
        Err(err @ BoardError::InvalidCard(_)) => Err((StatusCode::BAD_REQUEST, err.to_string())),
        Err(err) => {
            error!(player = player.as_str(), %err, "replace failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
        }
    }
}

/// Long-poll until the board next changes. A client that disconnects
/// withdraws its watch.
pub async fn watch(
    State(state): State<Arc<AppState>>,
    Path(player): Path<String>,
) -> BoardResponse {
    let _timer = REQUEST_LATENCY.with_label_values(&["watch"]).start_timer();
    let player = parse_player(&player)?;
    let _in_flight = InFlight::start();
    let view = state.board.watch(player.as_str()).await;
    WATCHES.inc();
    Ok(view)
}
