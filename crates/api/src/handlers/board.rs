//! Handlers for the SVG board.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use kubexy_core::board;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CircleCreated {
    /// `id` attribute of the new circle.
    pub id: &'static str,
    /// Circles on the board after this one was added.
    pub circles: usize,
}

/// GET /board.svg
pub async fn get_board(State(state): State<AppState>) -> impl IntoResponse {
    let svg = state.board.read().await.to_svg_string();
    ([(CONTENT_TYPE, "image/svg+xml")], svg)
}

/// POST /board/circles
///
/// Append the fixed circle to the board. Every call adds another circle,
/// all sharing the same id.
pub async fn create_circle(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut doc = state.board.write().await;
    board::create_circle(&mut doc)?;
    let circles = board::circle_count(&doc).unwrap_or_default();

    tracing::info!(circles, "Circle created on board");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CircleCreated {
                id: board::CIRCLE_ID,
                circles,
            },
        }),
    ))
}

/// DELETE /board
///
/// Replace the board with an empty one of the configured size.
pub async fn reset_board(State(state): State<AppState>) -> StatusCode {
    let fresh = board::new_board(state.config.board_width, state.config.board_height);
    *state.board.write().await = fresh;
    tracing::info!("Board reset");
    StatusCode::NO_CONTENT
}
