//! Byte-window estimation for partial fetches.
//!
//! Assumes a constant average bitrate across the asset. Over- or
//! under-fetching by a few seconds is accepted; the encoder seeks within
//! whatever window was fetched.

use std::fmt;

use clipr_models::VideoMetadata;

/// Assumed asset size when no format reports one.
pub const DEFAULT_TOTAL_BYTES: u64 = 50 * 1024 * 1024;

/// Window fetched when the total duration is unknown.
pub const UNKNOWN_DURATION_WINDOW: u64 = 1024 * 1024;

/// Inclusive byte window `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered (always at least 1 for a well-formed range).
    pub fn byte_count(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// Value for an HTTP `Range` header.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Clamp the window to an asset of `total` bytes, keeping at least one byte.
    pub fn clamp_to(self, total: u64) -> Self {
        if total == 0 {
            return self;
        }
        let last = total - 1;
        let end = self.end.min(last);
        let start = self.start.min(end);
        Self { start, end }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Estimate the byte window covering `[start_secs, start_secs + duration_secs]`.
pub fn estimate(metadata: &VideoMetadata, start_secs: f64, duration_secs: f64) -> ByteRange {
    let total_duration = metadata.duration_secs();
    if total_duration <= 0.0 {
        return ByteRange::new(0, UNKNOWN_DURATION_WINDOW - 1);
    }

    let total_bytes = metadata.first_known_size().unwrap_or(DEFAULT_TOTAL_BYTES);
    let bytes_per_second = total_bytes as f64 / total_duration;

    let start = (start_secs * bytes_per_second).floor() as u64;
    let end = ((start_secs + duration_secs) * bytes_per_second).floor() as u64;

    // A window starting past the end collapses onto the last byte.
    ByteRange::new(start, end).clamp_to(total_bytes)
}
