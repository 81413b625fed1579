//! Platform preset registry.
//!
//! Presets letterbox the source into the target frame and resample audio to
//! 48 kHz. Lookups never fail: unknown platforms get the `default` preset.

use clipr_models::{PlatformPreset, DEFAULT_PLATFORM};

const DEFAULT_PRESET: PlatformPreset = PlatformPreset::new(
    1280,
    720,
    "[0:v]scale=1280:720[v];[0:a]aresample=48000,volume=1[a]",
);

static PRESETS: &[(&str, PlatformPreset)] = &[
    (
        "instagram-feed",
        PlatformPreset::new(
            1080,
            1080,
            "[0:v]scale=1080:1080:force_original_aspect_ratio=decrease,pad=1080:1080:(ow-iw)/2:(oh-ih)/2[v];[0:a]aresample=48000,volume=1[a]",
        ),
    ),
    (
        "instagram-story",
        PlatformPreset::new(
            1080,
            1920,
            "[0:v]scale=1080:1920:force_original_aspect_ratio=decrease,pad=1080:1920:(ow-iw)/2:(oh-ih)/2[v];[0:a]aresample=48000,volume=1[a]",
        ),
    ),
    (
        "youtube",
        PlatformPreset::new(
            1920,
            1080,
            "[0:v]scale=1920:1080:force_original_aspect_ratio=decrease,pad=1920:1080:(ow-iw)/2:(oh-ih)/2[v];[0:a]aresample=48000,volume=1[a]",
        ),
    ),
    (
        "twitter",
        PlatformPreset::new(
            1280,
            720,
            "[0:v]scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2[v];[0:a]aresample=48000,volume=1[a]",
        ),
    ),
    (DEFAULT_PLATFORM, DEFAULT_PRESET),
];

/// Look up a platform's preset, falling back to `default`.
pub fn get(platform: &str) -> PlatformPreset {
    PRESETS
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|(_, preset)| *preset)
        .unwrap_or(DEFAULT_PRESET)
}

/// Names of all registered platforms.
pub fn platforms() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}
