use super::*;
use crate::config::Config;
use crate::error::{Error, Result as CrateResult};
use crate::service::AudioDownloader;
use crate::types::MediaInfo;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tower::ServiceExt;

mod download;

/// Bytes the mock extractor writes into artifacts it fabricates.
const MOCK_AUDIO: &[u8] = b"not really audio, but it streams like it";

/// Scripted stand-in for the yt-dlp collaborator.
///
/// `fail_with` makes both probe and fetch fail with an extraction error.
/// `artifact_ext` makes fetch write a fake artifact with that extension;
/// the reported extension is whatever `info.ext` says, so tests can make
/// the tool "lie" about its output.
struct MockExtractor {
    info: MediaInfo,
    fail_with: Option<String>,
    artifact_ext: Option<String>,
}

impl MockExtractor {
    fn succeeding() -> Self {
        Self {
            info: MediaInfo {
                title: "Never Gonna Give You Up".to_string(),
                duration_seconds: 212,
                thumbnail: "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".to_string(),
                channel: "Rick Astley".to_string(),
                ext: Some("m4a".to_string()),
            },
            fail_with: None,
            artifact_ext: Some("m4a".to_string()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            info: MediaInfo::default(),
            fail_with: Some(message.to_string()),
            artifact_ext: None,
        }
    }
}

#[async_trait]
impl crate::extractor::AudioExtractor for MockExtractor {
    async fn probe(&self, _url: &str) -> CrateResult<MediaInfo> {
        match &self.fail_with {
            Some(message) => Err(Error::Extraction(message.clone())),
            None => Ok(self.info.clone()),
        }
    }

    async fn fetch(&self, _url: &str, output_template: &str) -> CrateResult<MediaInfo> {
        if let Some(message) = &self.fail_with {
            return Err(Error::Extraction(message.clone()));
        }
        if let Some(ext) = &self.artifact_ext {
            let path = output_template.replace("%(ext)s", ext);
            std::fs::write(&path, MOCK_AUDIO).unwrap();
        }
        Ok(self.info.clone())
    }
}

/// Helper to create a test AudioDownloader with an isolated temp dir.
fn create_test_downloader(
    extractor: MockExtractor,
) -> (std::sync::Arc<AudioDownloader>, std::sync::Arc<Config>, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.temp_dir = temp_dir.path().to_path_buf();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = std::sync::Arc::new(config);

    let downloader = std::sync::Arc::new(AudioDownloader::with_extractor(
        (*config).clone(),
        std::sync::Arc::new(extractor),
    ));

    (downloader, config, temp_dir)
}

/// Drive a request through the router and parse the JSON response body.
async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());

    let api_handle = downloader.spawn_api_server();

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (downloader, _config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());

    let mut config = (*downloader.config()).as_ref().clone();
    config.server.cors_enabled = true;
    config.server.cors_origins = vec!["*".to_string()];
    let config = std::sync::Arc::new(config);

    let app = create_router(downloader, config);

    let request = Request::builder()
        .uri("/")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_server_starts_and_responds_over_http() {
    let (downloader, _config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());

    // Bind to a random available port (port 0)
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_downloader = downloader.clone();
    let server_config = std::sync::Arc::clone(downloader.config());
    let server_handle = tokio::spawn(async move {
        let app = create_router(server_downloader, server_config);
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let url = format!("http://{}/", addr);
    let response = client.get(url).send().await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Audio Downloader API");

    server_handle.abort();
}

#[tokio::test]
async fn test_swagger_ui_disabled_returns_404() {
    let (downloader, _config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());

    let mut config = (*downloader.config()).as_ref().clone();
    config.server.swagger_ui = false;
    let config = std::sync::Arc::new(config);

    let app = create_router(downloader, config);

    let response = app.oneshot(get_request("/swagger-ui/")).await.unwrap();

    assert_eq!(
        response.status(),
        StatusCode::NOT_FOUND,
        "Swagger UI should not be accessible when disabled"
    );
}

#[tokio::test]
async fn test_openapi_json_endpoint() {
    let (downloader, config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());

    let app = create_router(downloader, config);

    let response = app.oneshot(get_request("/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json.get("openapi").is_some(), "Should have 'openapi' field");
    assert!(json.get("paths").is_some(), "Should have 'paths' field");
    assert_eq!(json["info"]["title"], "audio-dl REST API");

    let openapi_version = json["openapi"].as_str().unwrap();
    assert!(openapi_version.starts_with("3."), "Should be OpenAPI 3.x");
}
