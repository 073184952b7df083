//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the audio-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the audio-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "audio-dl REST API",
        version = "0.1.0",
        description = "REST API for extracting and streaming audio from media URLs through an outbound proxy",
        contact(
            name = "audio-dl",
            url = "https://github.com/audio-dl/audio-dl"
        ),
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Media
        crate::api::routes::media_info,
        crate::api::routes::prepare_download,
        crate::api::routes::stream_audio,

        // History
        crate::api::routes::get_history,

        // System
        crate::api::routes::index,
        crate::api::routes::test_connectivity,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::DownloadToken,
        crate::types::DownloadRecord,
        crate::types::RecordStatus,
        crate::types::MediaInfo,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ServerConfig,
        crate::config::ProxyConfig,
        crate::config::ExtractorConfig,
        crate::config::JanitorConfig,

        // API request/response types from routes
        crate::api::routes::InfoRequest,
        crate::api::routes::InfoResponse,
        crate::api::routes::PrepareDownloadRequest,
        crate::api::routes::PrepareDownloadResponse,
        crate::api::routes::StreamQuery,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Media operations - Metadata lookup, download preparation, streamed delivery"),
        (name = "history", description = "Download history placeholder"),
        (name = "system", description = "System endpoints - Service index, connectivity probe, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
