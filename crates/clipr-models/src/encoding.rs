//! Output encoding profile and per-request processing options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Video codec (H.264)
pub const VIDEO_CODEC: &str = "libx264";
/// Encoder speed preset
pub const SPEED_PRESET: &str = "fast";
/// Audio codec
pub const AUDIO_CODEC: &str = "aac";
/// Audio bitrate
pub const AUDIO_BITRATE: &str = "128k";
/// Output container
pub const OUTPUT_FORMAT: &str = "mp4";

/// CRF used for `medium` and for any unrecognized quality.
pub const DEFAULT_CRF: u8 = 23;

/// Requested output quality.
///
/// Unknown strings are kept verbatim so they can be logged, but they encode
/// like `medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quality {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
            Quality::Other(s) => s,
        }
    }

    /// Constant rate factor for this quality (lower is better).
    pub fn crf(&self) -> u8 {
        match self {
            Quality::High => 18,
            Quality::Medium => DEFAULT_CRF,
            Quality::Low => 28,
            Quality::Other(_) => DEFAULT_CRF,
        }
    }
}

impl From<String> for Quality {
    fn from(s: String) -> Self {
        match s.as_str() {
            "high" => Quality::High,
            "medium" => Quality::Medium,
            "low" => Quality::Low,
            _ => Quality::Other(s),
        }
    }
}

impl From<&str> for Quality {
    fn from(s: &str) -> Self {
        Quality::from(s.to_string())
    }
}

impl From<Quality> for String {
    fn from(q: Quality) -> Self {
        q.as_str().to_string()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single output profile every clip is encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodingProfile {
    pub video_codec: &'static str,
    pub speed_preset: &'static str,
    pub audio_codec: &'static str,
    pub audio_bitrate: &'static str,
    pub container: &'static str,
}

impl EncodingProfile {
    pub const MP4_H264_AAC: EncodingProfile = EncodingProfile {
        video_codec: VIDEO_CODEC,
        speed_preset: SPEED_PRESET,
        audio_codec: AUDIO_CODEC,
        audio_bitrate: AUDIO_BITRATE,
        container: OUTPUT_FORMAT,
    };
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self::MP4_H264_AAC
    }
}

/// Options handed to the transcoder, derived from a validated clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Seek offset into the fetched input, in seconds
    pub start_secs: f64,
    /// Clip length in seconds
    pub duration_secs: f64,
    /// Platform preset name
    pub platform: String,
    /// Quality tier
    pub quality: Quality,
    /// Container format (always `mp4`)
    pub output_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crf_mapping() {
        assert_eq!(Quality::from("high").crf(), 18);
        assert_eq!(Quality::from("medium").crf(), 23);
        assert_eq!(Quality::from("low").crf(), 28);
        assert_eq!(Quality::from("unrecognized").crf(), 23);
    }

    #[test]
    fn test_quality_serde_round_trips_unknown_values() {
        let q: Quality = serde_json::from_str("\"ultra\"").unwrap();
        assert_eq!(q, Quality::Other("ultra".to_string()));
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"ultra\"");
        assert_eq!(q.to_string(), "ultra");
    }
}
