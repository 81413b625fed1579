//! Health, readiness and info endpoint tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use clipr_api::{create_router, ApiConfig, AppState};
use clipr_media::{FfmpegTranscoder, HttpRangeFetcher, YtDlpResolver};

fn app(config: ApiConfig) -> Router {
    let resolver = Arc::new(YtDlpResolver::new(&config.ytdlp_path));
    let transcoder = Arc::new(FfmpegTranscoder::new(&config.ffmpeg_path));
    let fetcher = HttpRangeFetcher::new(config.fetch_connect_timeout).unwrap();
    create_router(
        AppState::with_components(config, resolver, fetcher, transcoder),
        None,
    )
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Test that the health endpoint returns 200 OK.
#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(app(ApiConfig::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// Test that info lists every platform and the configured limits.
#[tokio::test]
async fn test_info_endpoint() {
    let config = ApiConfig {
        max_clip_duration_secs: 45,
        ..Default::default()
    };
    let (status, body) = get_json(app(config), "/info").await;

    assert_eq!(status, StatusCode::OK);
    let platforms: Vec<&str> = body["platforms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    for expected in [
        "instagram-feed",
        "instagram-story",
        "youtube",
        "twitter",
        "default",
    ] {
        assert!(platforms.contains(&expected), "missing {}", expected);
    }
    assert_eq!(body["max_clip_duration_secs"], 45);
    assert_eq!(body["request_budget_secs"], 720);
}

/// Test that readiness reports degraded when tools are missing.
#[tokio::test]
async fn test_ready_degraded_without_tools() {
    let scratch = tempfile::TempDir::new().unwrap();
    let config = ApiConfig {
        ffmpeg_path: PathBuf::from("/nonexistent/ffmpeg"),
        ytdlp_path: PathBuf::from("/nonexistent/yt-dlp"),
        scratch_dir: scratch.path().to_path_buf(),
        ..Default::default()
    };
    let (status, body) = get_json(app(config), "/ready").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["ffmpeg"]["status"], "error");
    assert_eq!(body["checks"]["ytdlp"]["status"], "error");
    assert_eq!(body["checks"]["scratch_dir"]["status"], "ok");
}

/// Test that responses carry a request id and security headers.
#[tokio::test]
async fn test_response_headers() {
    let response = app(ApiConfig::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

/// Test that unknown routes return 404.
#[tokio::test]
async fn test_not_found() {
    let response = app(ApiConfig::default())
        .oneshot(Request::builder().uri("/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
