//! Platform output presets.

use serde::Serialize;

/// Output geometry and filter graph for one target platform.
///
/// The filter graph is passed to the encoder verbatim and must label its
/// outputs `[v]` and `[a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformPreset {
    pub width: u32,
    pub height: u32,
    pub filter_graph: &'static str,
}

impl PlatformPreset {
    pub const fn new(width: u32, height: u32, filter_graph: &'static str) -> Self {
        Self {
            width,
            height,
            filter_graph,
        }
    }

    /// Width-to-height ratio.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}
