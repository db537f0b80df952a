use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kubexy_core::error::CoreError;
use serde_json::json;

use crate::kube_client::KubeClientError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and Kubernetes API failures.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `kubexy_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The Kubernetes API could not be read.
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] KubeClientError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Upstream errors ---
            AppError::Kube(err) => {
                tracing::warn!(error = %err, "Kubernetes API request failed");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
