//! Shared response envelope types for API handlers.
//!
//! JSON responses use a `{ "data": ... }` envelope, except `/view/pods`
//! which the board frontend reads as a bare map.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: summary }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
