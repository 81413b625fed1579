//! Clip extraction handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use tracing::{debug, warn};

use clipr_models::ClipRequest;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::clip::start_clip;
use crate::state::AppState;

/// Filename offered to the client for the downloaded clip.
const CLIP_FILENAME: &str = "clip.mp4";

/// Extract, transcode and stream a clip.
///
/// The body is parsed as JSON whatever its `Content-Type`. The response
/// status is decided once the encoder is running; encoded bytes are
/// forwarded as they are produced.
pub async fn create_clip(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let production = state.config.is_production();

    let request: ClipRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejected clip request body: {}", e);
        metrics::record_clip_failed("validation");
        ApiError::InvalidBody
    })?;

    let job = start_clip(&state, request).await.map_err(|e| {
        log_failure(&e);
        metrics::record_clip_failed(e.kind());
        e.redact(production)
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", CLIP_FILENAME),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .body(job.into_body())
        .map_err(|e| {
            warn!("Failed to build clip response: {}", e);
            ApiError::internal(format!("Failed to build response: {}", e)).redact(production)
        })
}

fn log_failure(error: &ApiError) {
    match error {
        ApiError::Media(e) => warn!(
            error = %e,
            kind = e.kind(),
            stderr = e.stderr().unwrap_or(""),
            "Clip request failed"
        ),
        _ => warn!(error = %error, kind = error.kind(), "Clip request rejected"),
    }
}
