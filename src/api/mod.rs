//! REST API server module
//!
//! Exposes the HTTP surface for metadata lookup, download-token issuance,
//! and streamed audio delivery, plus the connectivity probe and OpenAPI
//! documentation.

use crate::error::{Error, Result};
use crate::service::AudioDownloader;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Media
/// - `POST /api/info` - Get media metadata
/// - `POST /download` - Prepare a download and issue a token
/// - `GET /api/stream` - Download and stream the audio artifact
///
/// ## History
/// - `GET /api/history` - Download history (placeholder, always empty)
///
/// ## System
/// - `GET /` - Service metadata and endpoint table
/// - `GET /test` - Extraction connectivity probe
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(downloader: Arc<AudioDownloader>, config: Arc<crate::Config>) -> Router {
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // System
        .route("/", get(routes::index))
        .route("/test", get(routes::test_connectivity))
        .route("/openapi.json", get(routes::openapi_spec))
        // Media
        .route("/api/info", post(routes::media_info))
        .route("/download", post(routes::prepare_download))
        .route("/api/stream", get(routes::stream_audio))
        // History
        .route("/api/history", get(routes::get_history));

    // Merge Swagger UI routes if enabled in config (before applying state).
    // SwaggerUi serves its own copy of the spec at a distinct path so it does
    // not collide with the /openapi.json route above.
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Origins containing "*" (or an empty list) allow any origin; otherwise
/// only the listed origins are allowed. All methods and headers are allowed
/// either way.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Binds a TCP listener and serves the router until the server stops.
///
/// # Errors
///
/// Returns an error when the listener cannot bind or the server fails.
///
/// # Example
///
/// ```no_run
/// use audio_dl::{AudioDownloader, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Arc::new(AudioDownloader::new(Config::from_env())?);
///
/// // Start API server (blocks until shutdown)
/// audio_dl::api::start_api_server(downloader).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(downloader: Arc<AudioDownloader>) -> Result<()> {
    let config = Arc::clone(downloader.config());
    let bind_address = config.server.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(downloader, config);

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
