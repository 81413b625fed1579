//! Video metadata resolution using yt-dlp.
//!
//! yt-dlp is asked for both its JSON record and the direct media URL in one
//! run. The output must contain at least two non-empty lines: the JSON record
//! (the line starting with `{`) and the direct URL (the first other line).

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use clipr_models::VideoMetadata;

use crate::context::{RequestContext, Stage};
use crate::error::{MediaError, MediaResult};

/// Resolves a page URL into metadata and a directly fetchable media URL.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, ctx: &RequestContext, url: &str) -> MediaResult<VideoMetadata>;
}

/// [`MetadataResolver`] backed by the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    binary: PathBuf,
}

impl YtDlpResolver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for one resolution run.
    pub fn build_args(url: &str) -> Vec<String> {
        vec![
            "-j".to_string(),
            "-g".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl MetadataResolver for YtDlpResolver {
    async fn resolve(&self, ctx: &RequestContext, url: &str) -> MediaResult<VideoMetadata> {
        info!(url = %url, "Resolving video metadata");

        let output = ctx
            .run(Stage::Resolving, async {
                Command::new(&self.binary)
                    .args(Self::build_args(url))
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .kill_on_drop(true)
                    .output()
                    .await
                    .map_err(|e| MediaError::resolution(format!("failed to run yt-dlp: {}", e), None))
            })
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            let last_line = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string);
            let status = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            warn!(
                url = %url,
                status = %status,
                error = last_line.as_deref().unwrap_or("unknown error"),
                "yt-dlp failed"
            );
            return Err(MediaError::resolution(
                format!("yt-dlp exited with status {}", status),
                last_line,
            ));
        }

        let metadata = parse_output(url, &String::from_utf8_lossy(&output.stdout))?;
        info!(
            title = %metadata.title,
            duration = metadata.duration_secs(),
            formats = metadata.formats.len(),
            "Resolved video metadata"
        );
        Ok(metadata)
    }
}

/// Parse yt-dlp's combined `-j -g` output.
pub fn parse_output(requested_url: &str, stdout: &str) -> MediaResult<VideoMetadata> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(MediaError::resolution(
            format!("expected metadata and media URL, got {} line(s)", lines.len()),
            None,
        ));
    }

    let json_idx = lines.iter().position(|l| l.starts_with('{')).unwrap_or(0);
    let direct_url = lines
        .iter()
        .enumerate()
        .find(|(i, _)| *i != json_idx)
        .map(|(_, l)| l.to_string())
        .unwrap_or_default();

    let mut metadata: VideoMetadata = serde_json::from_str(lines[json_idx])
        .map_err(|e| MediaError::resolution(format!("invalid metadata JSON: {}", e), None))?;

    if direct_url == requested_url {
        return Err(MediaError::resolution(
            "extractor returned the page URL instead of a media URL",
            None,
        ));
    }

    if metadata.source_url.is_empty() {
        metadata.source_url = requested_url.to_string();
    }
    metadata.direct_fetch_url = direct_url;
    Ok(metadata)
}
