//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "clipr_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "clipr_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "clipr_http_requests_in_flight";

    // Clip pipeline metrics
    pub const CLIPS_STARTED_TOTAL: &str = "clipr_clips_started_total";
    pub const CLIPS_FAILED_TOTAL: &str = "clipr_clips_failed_total";
    pub const CLIPS_STREAMED_TOTAL: &str = "clipr_clips_streamed_total";
    pub const STREAM_FAILURES_TOTAL: &str = "clipr_stream_failures_total";
    pub const STAGE_DURATION_SECONDS: &str = "clipr_stage_duration_seconds";
    pub const FETCH_MODE_TOTAL: &str = "clipr_fetch_mode_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a clip request that passed validation.
pub fn record_clip_started(platform: &str) {
    let labels = [("platform", platform.to_string())];
    counter!(names::CLIPS_STARTED_TOTAL, &labels).increment(1);
}

/// Record a clip request that failed before streaming began.
pub fn record_clip_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::CLIPS_FAILED_TOTAL, &labels).increment(1);
}

/// Record a clip whose stream completed cleanly.
pub fn record_clip_streamed(platform: &str) {
    let labels = [("platform", platform.to_string())];
    counter!(names::CLIPS_STREAMED_TOTAL, &labels).increment(1);
}

/// Record a failure after the response status was committed.
pub fn record_stream_failure(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::STREAM_FAILURES_TOTAL, &labels).increment(1);
}

/// Record how long a pipeline stage took.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record which fetch mode a request used.
pub fn record_fetch_mode(mode: &str) {
    let labels = [("mode", mode.to_string())];
    counter!(names::FETCH_MODE_TOTAL, &labels).increment(1);
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    // Route templates keep label cardinality bounded.
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
