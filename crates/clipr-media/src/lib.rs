#![deny(unreachable_patterns)]
//! Media pipeline for clip extraction.
//!
//! This crate provides:
//! - Metadata resolution through yt-dlp
//! - Byte-window estimation and ranged HTTP fetch into scratch storage
//! - The platform preset registry
//! - FFmpeg command building and a process-bound output stream
//! - A per-request deadline and cancellation context shared by every stage

pub mod command;
pub mod context;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod presets;
pub mod range;
pub mod scratch;
pub mod transcode;

pub use command::{locate_tool, FfmpegCommand};
pub use context::{RequestContext, Stage};
pub use error::{MediaError, MediaResult};
pub use fetch::{FetchMode, FetchOutcome, HttpRangeFetcher, ProbeResult};
pub use metadata::{MetadataResolver, YtDlpResolver};
pub use range::{estimate, ByteRange};
pub use scratch::ScratchFile;
pub use transcode::{FfmpegTranscoder, TranscodeStream, Transcoder};
