//! Handlers for the pod view consumed by the board frontend.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use kubexy_core::error::CoreError;
use kubexy_core::pod::PodDetails;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /view/pods
///
/// All current pods keyed by `namespace/name`. Returned without the data
/// envelope because the frontend polls it as a plain map.
pub async fn list_pods(State(state): State<AppState>) -> Json<BTreeMap<String, PodDetails>> {
    Json(state.pods.snapshot().await)
}

/// POST /view/pods/refresh
///
/// Re-read the cluster immediately instead of waiting for the next
/// background refresh. Only available in cluster mode.
pub async fn refresh_pods(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cluster = state.cluster.as_ref().ok_or_else(|| {
        CoreError::Conflict("pod refresh is only available in cluster mode".into())
    })?;

    let summary = cluster.refresh().await?;
    Ok(Json(DataResponse { data: summary }))
}
