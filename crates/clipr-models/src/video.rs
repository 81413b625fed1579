//! Video metadata models.
//!
//! Field names follow the JSON record `yt-dlp -j` prints, so the record can
//! be deserialized directly. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// One downloadable rendition of a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Format {
    #[serde(default, rename = "format_id")]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Exact size in bytes, when the host reports it
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default, rename = "vcodec")]
    pub video_codec: Option<String>,
    #[serde(default, rename = "acodec")]
    pub audio_codec: Option<String>,
}

impl Format {
    /// Exact nonzero size in bytes. `filesize_approx` is not consulted.
    pub fn size_bytes(&self) -> Option<u64> {
        self.filesize.filter(|&s| s > 0)
    }
}

/// Metadata for a remote video, as resolved by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Canonical page URL
    #[serde(default, rename = "webpage_url")]
    pub source_url: String,
    #[serde(default)]
    pub title: String,
    /// Total duration in seconds; absent for live or unknown-length media
    #[serde(default, rename = "duration")]
    pub total_duration_secs: Option<f64>,
    #[serde(default)]
    pub formats: Vec<Format>,
    /// Direct media URL; filled from the extractor's second output line
    #[serde(default, skip_deserializing)]
    pub direct_fetch_url: String,
}

impl VideoMetadata {
    /// Total duration in seconds, or 0 when unknown or nonsensical.
    pub fn duration_secs(&self) -> f64 {
        match self.total_duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => 0.0,
        }
    }

    /// Size of the first format reporting a known nonzero size.
    pub fn first_known_size(&self) -> Option<u64> {
        self.formats.iter().find_map(Format::size_bytes)
    }
}
