//! Shared data models for the clipr clip service.
//!
//! This crate provides Serde-serializable types for:
//! - Inbound clip requests and their validated form
//! - Video metadata reported by the extractor
//! - The fixed output encoding profile and quality tiers
//! - Platform presets

pub mod clip;
pub mod encoding;
pub mod preset;
pub mod video;

// Re-export common types
pub use clip::{ClipRequest, ClipSpec, ValidationError, DEFAULT_PLATFORM};
pub use encoding::{EncodingProfile, ProcessingOptions, Quality};
pub use preset::PlatformPreset;
pub use video::{Format, VideoMetadata};
