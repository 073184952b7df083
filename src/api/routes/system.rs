//! System handlers: service index, connectivity probe, OpenAPI spec.

use crate::api::AppState;
use crate::extractor::watch_url;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// GET / - Service metadata and endpoint table
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service metadata and endpoint table")
    )
)]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Audio Downloader API",
        "proxy": state.config.proxy_display(),
        "endpoints": {
            "/api/info": "POST - Get video info",
            "/download": "POST - Prepare download",
            "/api/stream": "GET - Stream/download audio",
            "/test": "GET - Test connectivity"
        }
    }))
}

/// GET /test - Extraction connectivity probe
///
/// Probes a well-known media identifier through the extractor and reports
/// the outcome in the body. Deliberately never fails the HTTP call itself:
/// errors are stringified into the `youtube_test` field so the probe result
/// is always readable.
#[utoipa::path(
    get,
    path = "/test",
    tag = "system",
    responses(
        (status = 200, description = "Probe outcome, success or stringified failure")
    )
)]
pub async fn test_connectivity(State(state): State<AppState>) -> impl IntoResponse {
    let proxy = state.config.proxy_display().to_string();
    let url = watch_url(&state.config.extractor.test_media_id);

    match state.downloader.extractor().probe(&url).await {
        Ok(info) => Json(json!({
            "proxy": proxy,
            "youtube_test": "success",
            "test_video": info.title,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Connectivity probe failed");
            Json(json!({
                "proxy": proxy,
                "youtube_test": format!("failed: {e}"),
            }))
        }
    }
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
