//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
///
/// Loaded once at startup and shared read-only; every request sees the same
/// values for its whole lifetime.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Path to the ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Path to the yt-dlp binary
    pub ytdlp_path: PathBuf,
    /// Directory for request-scoped scratch files
    pub scratch_dir: PathBuf,
    /// Memory ceiling of the host, reported by `/info`
    pub memory_limit_mb: u64,
    /// Longest clip a caller may request, in seconds
    pub max_clip_duration_secs: u64,
    /// Hard wall-clock limit of the hosting environment
    pub execution_limit: Duration,
    /// Headroom kept below the execution limit
    pub safety_margin: Duration,
    /// Connect timeout for media host requests
    pub fetch_connect_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Whether `/metrics` is served
    pub metrics_enabled: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            ffmpeg_path: PathBuf::from("/opt/bin/ffmpeg"),
            ytdlp_path: PathBuf::from("/opt/bin/yt-dlp"),
            scratch_dir: PathBuf::from("/tmp"),
            memory_limit_mb: 2048,
            max_clip_duration_secs: 30,
            execution_limit: Duration::from_secs(900),
            safety_margin: Duration::from_secs(180),
            fetch_connect_timeout: Duration::from_secs(10),
            max_body_size: 64 * 1024, // 64KB
            cors_origins: vec!["*".to_string()],
            metrics_enabled: true,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables, defaulting every key.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: parse_var("API_PORT").unwrap_or(defaults.port),
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_path),
            ytdlp_path: std::env::var("YTDLP_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ytdlp_path),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            memory_limit_mb: parse_var("MEMORY_LIMIT_MB")
                .or_else(|| parse_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE"))
                .unwrap_or(defaults.memory_limit_mb),
            max_clip_duration_secs: parse_var("MAX_CLIP_DURATION")
                .unwrap_or(defaults.max_clip_duration_secs),
            execution_limit: parse_var("EXECUTION_LIMIT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.execution_limit),
            safety_margin: parse_var("SAFETY_MARGIN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.safety_margin),
            fetch_connect_timeout: parse_var("FETCH_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_connect_timeout),
            max_body_size: parse_var("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Wall-clock budget for one clip request.
    pub fn request_budget(&self) -> Duration {
        self.execution_limit.saturating_sub(self.safety_margin)
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
