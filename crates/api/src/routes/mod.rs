pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree (everything except `/health` and the
/// static frontend).
///
/// Route hierarchy:
///
/// ```text
/// /view/pods                 pods keyed by namespace/name (GET)
/// /view/pods/refresh         re-read the cluster now (POST, cluster mode)
///
/// /board.svg                 current board document (GET)
/// /board/circles             append the circle (POST)
/// /board                     reset to an empty board (DELETE)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/view/pods", get(handlers::pods::list_pods))
        .route("/view/pods/refresh", post(handlers::pods::refresh_pods))
        .route("/board.svg", get(handlers::board::get_board))
        .route("/board/circles", post(handlers::board::create_circle))
        .route("/board", delete(handlers::board::reset_board))
}
