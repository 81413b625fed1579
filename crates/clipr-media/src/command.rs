//! FFmpeg command builder and tool lookup.

use std::path::{Path, PathBuf};

use clipr_models::{EncodingProfile, PlatformPreset, ProcessingOptions};

/// Output target that writes the container to stdout.
pub const STDOUT_TARGET: &str = "pipe:1";

/// Fragmented MP4 flags; a pipe cannot take a back-patched `moov` atom.
pub const STREAMING_MOVFLAGS: &str = "+faststart+frag_keyframe+empty_moov";

/// ffmpeg log level; only errors reach the stderr tail.
const LOG_LEVEL: &str = "error";

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target
    output: String,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.into(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Build the fixed clip command for one request.
    pub fn for_clip(
        input: impl AsRef<Path>,
        options: &ProcessingOptions,
        preset: &PlatformPreset,
    ) -> Self {
        let profile = EncodingProfile::default();
        Self::new(input, STDOUT_TARGET)
            .seek(options.start_secs)
            .duration(options.duration_secs)
            .filter_complex(preset.filter_graph)
            .map("[v]")
            .map("[a]")
            .video_codec(profile.video_codec)
            .preset(profile.speed_preset)
            .crf(options.quality.crf())
            .audio_codec(profile.audio_codec)
            .audio_bitrate(profile.audio_bitrate)
            .movflags(STREAMING_MOVFLAGS)
            .format(profile.container)
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set seek position (before input).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.2}", seconds))
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.2}", seconds))
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a labelled stream into the output.
    pub fn map(self, label: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(label)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set container flags.
    pub fn movflags(self, flags: impl Into<String>) -> Self {
        self.output_arg("-movflags").output_arg(flags)
    }

    /// Force the output container.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            LOG_LEVEL.to_string(),
            "-nostdin".to_string(),
        ];

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.clone());

        args
    }
}

/// Resolve a tool path (absolute or on `PATH`) to an executable.
pub fn locate_tool(path: impl AsRef<Path>) -> Option<PathBuf> {
    which::which(path.as_ref()).ok()
}
