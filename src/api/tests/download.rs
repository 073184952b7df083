use super::*;
use crate::types::RecordStatus;
use serde_json::json;

#[tokio::test]
async fn prepare_download_issues_token_and_stream_url() {
    let (downloader, config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());
    let app = create_router(downloader.clone(), config);

    let response = app
        .oneshot(post_json(
            "/download",
            json!({"videoId": "dQw4w9WgXcQ", "format": "m4a"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "audio.m4a");

    let download_url = body["downloadUrl"].as_str().unwrap();
    assert!(download_url.starts_with("/api/stream?token="));
    assert!(download_url.contains("videoId=dQw4w9WgXcQ"));
    assert!(download_url.contains("format=m4a"));

    // The registry now holds exactly one pending record for this media id
    assert_eq!(downloader.registry().len(), 1);
    let token = download_url
        .split("token=")
        .nth(1)
        .unwrap()
        .split('&')
        .next()
        .unwrap();
    let record = downloader.registry().get(token).unwrap();
    assert_eq!(record.media_id, "dQw4w9WgXcQ");
    assert_eq!(record.format, "m4a");
    assert_eq!(record.status, RecordStatus::Pending);
    assert!(record.path.is_none());
}

#[tokio::test]
async fn prepare_download_defaults_format_to_mp3() {
    let (downloader, config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());
    let app = create_router(downloader, config);

    let response = app
        .oneshot(post_json("/download", json!({"videoId": "abc123"})))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["filename"], "audio.mp3");
    assert!(body["downloadUrl"].as_str().unwrap().contains("format=mp3"));
}

#[tokio::test]
async fn prepare_download_without_video_id_is_400_and_registers_nothing() {
    let (downloader, config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());
    let app = create_router(downloader.clone(), config);

    let response = app
        .oneshot(post_json("/download", json!({"format": "mp3"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // This route keeps its historical failure shape
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "videoId is required");

    assert!(
        downloader.registry().is_empty(),
        "no token may be registered on validation failure"
    );
}

#[tokio::test]
async fn repeated_preparation_yields_distinct_tokens() {
    let (downloader, config, _temp_dir) = create_test_downloader(MockExtractor::succeeding());
    let app = create_router(downloader.clone(), config);

    let first = app
        .clone()
        .oneshot(post_json("/download", json!({"videoId": "abc123"})))
        .await
        .unwrap();
    let first_url = json_body(first).await["downloadUrl"]
        .as_str()
        .unwrap()
        .to_string();

    // The token input hashes the issuance instant, so an identical request
    // a moment later must produce a different token.
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;

    let second = app
        .oneshot(post_json("/download", json!({"videoId": "abc123"})))
        .await
        .unwrap();
    let second_url = json_body(second).await["downloadUrl"]
        .as_str()
        .unwrap()
        .to_string();

    assert_ne!(first_url, second_url);
    assert_eq!(downloader.registry().len(), 2);
}
