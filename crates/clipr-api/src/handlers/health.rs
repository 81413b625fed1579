//! Health, readiness and service info handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use clipr_media::{locate_tool, presets};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ytdlp: CheckStatus,
    pub scratch_dir: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok(path: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            path: Some(path.into()),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            path: None,
            error: Some(msg.into()),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

fn tool_check(path: &std::path::Path) -> CheckStatus {
    match locate_tool(path) {
        Some(found) => CheckStatus::ok(found.display().to_string()),
        None => CheckStatus::error(format!("{} not found or not executable", path.display())),
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks that both tools resolve to executables and the scratch directory exists.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let config = &state.config;

    let scratch_check = match tokio::fs::metadata(&config.scratch_dir).await {
        Ok(meta) if meta.is_dir() => CheckStatus::ok(config.scratch_dir.display().to_string()),
        Ok(_) => CheckStatus::error("scratch path is not a directory"),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let checks = ReadinessChecks {
        ffmpeg: tool_check(&config.ffmpeg_path),
        ytdlp: tool_check(&config.ytdlp_path),
        scratch_dir: scratch_check,
    };

    let all_ok = checks.ffmpeg.is_ok() && checks.ytdlp.is_ok() && checks.scratch_dir.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks,
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Service info response.
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub platforms: Vec<&'static str>,
    pub max_clip_duration_secs: u64,
    pub memory_limit_mb: u64,
    pub request_budget_secs: u64,
}

/// Supported platforms and limits.
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = &state.config;
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        platforms: presets::platforms(),
        max_clip_duration_secs: config.max_clip_duration_secs,
        memory_limit_mb: config.memory_limit_mb,
        request_budget_secs: config.request_budget().as_secs(),
    })
}
