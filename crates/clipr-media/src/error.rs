//! Error types for media operations.

use thiserror::Error;

use crate::context::Stage;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while resolving, fetching or transcoding a clip.
///
/// The display text carries the stage context and is safe to return to
/// callers. Tool stderr is kept in separate fields for logging only.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to get video info: {message}")]
    Resolution {
        message: String,
        stderr: Option<String>,
    },

    #[error("Failed to download video segment: {message}")]
    Fetch { message: String },

    #[error("Failed to start transcoding: {message}")]
    TranscodeStart { message: String },

    #[error("Transcoding failed: {message}")]
    TranscodeRuntime {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Timed out while {stage}")]
    Timeout { stage: Stage },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a resolution failure error.
    pub fn resolution(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Resolution {
            message: message.into(),
            stderr,
        }
    }

    /// Create a fetch failure error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a transcoder spawn failure error.
    pub fn transcode_start(message: impl Into<String>) -> Self {
        Self::TranscodeStart {
            message: message.into(),
        }
    }

    /// Create a transcoder runtime failure error.
    pub fn transcode_runtime(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscodeRuntime {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "resolution",
            Self::Fetch { .. } => "fetch",
            Self::TranscodeStart { .. } => "transcode_start",
            Self::TranscodeRuntime { .. } => "transcode_runtime",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Captured tool stderr, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Resolution { stderr, .. } | Self::TranscodeRuntime { stderr, .. } => {
                stderr.as_deref()
            }
            _ => None,
        }
    }

    /// Whether the error is caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}
