//! History handler.
//!
//! Present as an API-shape placeholder: the registry is process-lifetime
//! and records nothing once served, so history is always empty.

use axum::{Json, http::StatusCode, response::IntoResponse};

/// GET /api/history - Download history (always empty)
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "history",
    responses(
        (status = 200, description = "Download history (always an empty list)")
    )
)]
pub async fn get_history() -> impl IntoResponse {
    (StatusCode::OK, Json(Vec::<serde_json::Value>::new()))
}
