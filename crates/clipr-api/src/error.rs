//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use clipr_media::MediaError;
use clipr_models::ValidationError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Media(#[from] MediaError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Media(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Media(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Hide internal error details when running in production.
    pub fn redact(self, production: bool) -> Self {
        match self {
            ApiError::Internal(_) if production => {
                ApiError::Internal("request could not be completed".to_string())
            }
            other => other,
        }
    }

    /// Label for the clip outcome metric.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidBody | ApiError::Validation(_) => "validation",
            ApiError::Media(e) => e.kind(),
            ApiError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error = self.to_string();

        (status, Json(ErrorResponse { error })).into_response()
    }
}
