//! Inbound clip request and the validated clip specification.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::encoding::{ProcessingOptions, Quality, OUTPUT_FORMAT};

/// Platform used when the request leaves it unset.
pub const DEFAULT_PLATFORM: &str = "default";

/// Raw clip request body as received from the caller.
///
/// Every field defaults so that a partially filled body still deserializes
/// and is rejected by [`ClipSpec::validate`] with a readable message instead
/// of a serde error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipRequest {
    /// Source page URL (YouTube, Vimeo, ...)
    #[serde(default)]
    pub url: String,
    /// Clip start in seconds
    #[serde(default)]
    pub start: f64,
    /// Clip end in seconds
    #[serde(default)]
    pub end: f64,
    /// Target platform preset name
    #[serde(default)]
    pub platform: Option<String>,
    /// Quality tier (`high`, `medium`, `low`)
    #[serde(default)]
    pub quality: Option<String>,
}

/// Reasons a clip request is rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("start time must be non-negative")]
    NegativeStart,

    #[error("end time must be greater than start time")]
    EndNotAfterStart,

    #[error("duration exceeds maximum of {max_secs} seconds")]
    DurationExceeded { max_secs: u64 },
}

/// A validated, immutable clip specification.
///
/// Only constructible through [`ClipSpec::validate`], so holding one means
/// `0 <= start < end` and `end - start <= max duration` held at validation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    source_url: String,
    start_secs: f64,
    end_secs: f64,
    platform: String,
    quality: Quality,
}

impl ClipSpec {
    /// Validate a raw request against the configured maximum clip duration.
    pub fn validate(request: ClipRequest, max_duration_secs: u64) -> Result<Self, ValidationError> {
        let url = request.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ValidationError::InvalidUrl(format!(
                    "unsupported scheme '{}'",
                    scheme
                )))
            }
        }

        if request.start < 0.0 {
            return Err(ValidationError::NegativeStart);
        }
        if request.end <= request.start {
            return Err(ValidationError::EndNotAfterStart);
        }

        let spec = Self {
            source_url: url.to_string(),
            start_secs: request.start,
            end_secs: request.end,
            platform: request
                .platform
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            quality: request
                .quality
                .filter(|q| !q.trim().is_empty())
                .map(Quality::from)
                .unwrap_or_default(),
        };

        spec.check_duration(max_duration_secs)?;
        Ok(spec)
    }

    /// Check the requested duration against a maximum.
    ///
    /// Used both at validation time and again after metadata resolution; both
    /// call sites must pass the same configured value.
    pub fn check_duration(&self, max_duration_secs: u64) -> Result<(), ValidationError> {
        if self.duration_secs() > max_duration_secs as f64 {
            return Err(ValidationError::DurationExceeded {
                max_secs: max_duration_secs,
            });
        }
        Ok(())
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn quality(&self) -> &Quality {
        &self.quality
    }

    /// Requested clip length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Derive the transcoder options for this clip.
    pub fn processing_options(&self) -> ProcessingOptions {
        ProcessingOptions {
            start_secs: self.start_secs,
            duration_secs: self.duration_secs(),
            platform: self.platform.clone(),
            quality: self.quality.clone(),
            output_format: OUTPUT_FORMAT.to_string(),
        }
    }
}
