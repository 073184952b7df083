//! Media handlers: metadata lookup, download preparation, streamed delivery.

use super::{InfoRequest, InfoResponse, PrepareDownloadRequest, PrepareDownloadResponse, StreamQuery};
use crate::api::AppState;
use crate::error::Error;
use crate::extractor::{
    canonical_watch_url, content_type_for, resolve_artifact, unique_artifact_base, watch_url,
};
use crate::stream::{CleanupGuard, FileStream};
use crate::types::{DownloadRecord, DownloadToken};
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use urlencoding::encode;

/// POST /api/info - Get media metadata
///
/// Accepts a full URL or a bare media identifier (expanded to a canonical
/// watch URL). Metadata-only: nothing is downloaded.
#[utoipa::path(
    post,
    path = "/api/info",
    tag = "media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Media metadata", body = InfoResponse),
        (status = 400, description = "Missing url field", body = crate::error::ApiError),
        (status = 500, description = "Extraction failure", body = crate::error::ApiError)
    )
)]
pub async fn media_info(
    State(state): State<AppState>,
    Json(request): Json<InfoRequest>,
) -> Response {
    if request.url.trim().is_empty() {
        return Error::missing_field("url").into_response();
    }

    let url = canonical_watch_url(&request.url);

    match state.downloader.extractor().probe(&url).await {
        Ok(info) => (
            StatusCode::OK,
            Json(InfoResponse {
                title: info.title,
                duration: info.duration_seconds,
                thumbnail: info.thumbnail,
                channel: info.channel,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Metadata lookup failed");
            e.into_response()
        }
    }
}

/// POST /download - Prepare a download and issue a token
///
/// Registers a pending record and returns the stream URL to fetch it with.
/// No extraction happens here; the actual download is deferred to
/// GET /api/stream.
#[utoipa::path(
    post,
    path = "/download",
    tag = "media",
    request_body = PrepareDownloadRequest,
    responses(
        (status = 200, description = "Download prepared", body = PrepareDownloadResponse),
        (status = 400, description = "Missing videoId field")
    )
)]
pub async fn prepare_download(
    State(state): State<AppState>,
    Json(request): Json<PrepareDownloadRequest>,
) -> Response {
    if request.video_id.trim().is_empty() {
        // This route keeps its historical {success, error} failure shape
        // instead of the structured ApiError body.
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "videoId is required"})),
        )
            .into_response();
    }

    let record = DownloadRecord::new(request.video_id.clone(), request.format.clone());
    let token = record.token.clone();
    state.downloader.registry().insert(record);

    tracing::info!(
        media_id = %request.video_id,
        format = %request.format,
        token = %token,
        "Download prepared"
    );

    let download_url = format!(
        "/api/stream?token={}&videoId={}&format={}",
        encode(token.as_str()),
        encode(&request.video_id),
        encode(&request.format),
    );

    (
        StatusCode::OK,
        Json(PrepareDownloadResponse {
            success: true,
            download_url,
            filename: format!("audio.{}", request.format),
        }),
    )
        .into_response()
}

/// GET /api/stream - Download and stream the audio artifact
///
/// Runs the extraction synchronously within the request, resolves the real
/// artifact path (the tool does not always honor its reported extension),
/// and streams it back with cleanup on every exit path. One-shot: the same
/// artifact cannot be re-streamed after first delivery.
#[utoipa::path(
    get,
    path = "/api/stream",
    tag = "media",
    params(
        ("videoId" = String, Query, description = "Media identifier to fetch"),
        ("format" = Option<String>, Query, description = "Output container hint (default mp3)"),
        ("token" = Option<String>, Query, description = "Token issued by POST /download")
    ),
    responses(
        (status = 200, description = "Audio bytes as an attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Missing videoId", body = crate::error::ApiError),
        (status = 500, description = "Extraction or artifact-resolution failure", body = crate::error::ApiError)
    )
)]
pub async fn stream_audio(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Response {
    if query.video_id.trim().is_empty() {
        return Error::missing_field("videoId").into_response();
    }

    let url = watch_url(&query.video_id);
    let base = unique_artifact_base(&state.config.temp_dir, &query.video_id);
    let output_template = format!("{}.%(ext)s", base.display());

    let info = match state
        .downloader
        .extractor()
        .fetch(&url, &output_template)
        .await
    {
        Ok(info) => info,
        Err(e) => {
            tracing::error!(media_id = %query.video_id, error = %e, "Audio fetch failed");
            return e.into_response();
        }
    };

    let (path, ext) = match resolve_artifact(&base, info.ext.as_deref(), &query.video_id) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(media_id = %query.video_id, error = %e, "Artifact resolution failed");
            return e.into_response();
        }
    };

    let file_size = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata.len(),
        Err(e) => return Error::Io(e).into_response(),
    };

    // Tie the artifact to its registry record when the caller presented a
    // known token, so the janitor can reclaim the file if delivery stalls.
    let registry = state.downloader.registry();
    let guard = match &query.token {
        Some(token) if registry.attach_artifact(token, path.clone()) => CleanupGuard::tracked(
            path.clone(),
            std::sync::Arc::clone(registry),
            DownloadToken(token.clone()),
        ),
        _ => CleanupGuard::new(path.clone()),
    };

    let stream = match FileStream::open(&path, guard).await {
        Ok(stream) => stream,
        Err(e) => return Error::Io(e).into_response(),
    };

    tracing::info!(
        media_id = %query.video_id,
        ext = %ext,
        size_bytes = file_size,
        "Streaming audio artifact"
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&ext).to_string()),
            (header::CONTENT_LENGTH, file_size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"audio.{ext}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
