//! Transcoding pipeline.
//!
//! [`FfmpegTranscoder`] spawns ffmpeg against a fetched scratch input and
//! hands back a [`TranscodeStream`] as soon as the process is running. The
//! stream owns the process and the scratch file: reading it reads ffmpeg's
//! stdout, and [`TranscodeStream::close`] / [`TranscodeStream::abort`] reap
//! the process before removing the input. Dropping an unclosed stream kills
//! the process and removes the input.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, ReadBuf};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use clipr_models::{PlatformPreset, ProcessingOptions};

use crate::command::FfmpegCommand;
use crate::context::{RequestContext, Stage};
use crate::error::{MediaError, MediaResult};
use crate::scratch::ScratchFile;

/// Number of trailing stderr lines kept for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// How long to wait for the stderr drain after the process exits.
const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Starts an encoder for a fetched input.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Start encoding `input`. Ownership of the scratch file moves into the
    /// returned stream; on error it is removed before returning.
    async fn start(
        &self,
        ctx: &RequestContext,
        input: ScratchFile,
        options: &ProcessingOptions,
        preset: &PlatformPreset,
    ) -> MediaResult<TranscodeStream>;
}

/// [`Transcoder`] backed by the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn start(
        &self,
        ctx: &RequestContext,
        input: ScratchFile,
        options: &ProcessingOptions,
        preset: &PlatformPreset,
    ) -> MediaResult<TranscodeStream> {
        if ctx.is_cancelled() {
            return Err(ctx.interruption(Stage::Transcoding));
        }

        let args = FfmpegCommand::for_clip(input.path(), options, preset).build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&args);
        let stream = TranscodeStream::spawn(command, input)?;

        info!(
            pid = ?stream.id(),
            platform = %options.platform,
            quality = %options.quality,
            start = options.start_secs,
            duration = options.duration_secs,
            "Started transcode"
        );
        Ok(stream)
    }
}

/// Live encoder output bound to the encoder's process lifetime.
#[derive(Debug)]
pub struct TranscodeStream {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    scratch: ScratchFile,
}

impl TranscodeStream {
    /// Spawn `command` with piped output and take ownership of `scratch`.
    ///
    /// Stdio and kill-on-drop are configured here, so callers only set the
    /// program and its arguments.
    pub fn spawn(mut command: Command, scratch: ScratchFile) -> MediaResult<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| MediaError::transcode_start(format!("failed to spawn encoder: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::transcode_start("encoder stdout not captured"))?;
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(drain_stderr(stderr)));

        Ok(Self {
            child,
            stdout: Some(stdout),
            stderr_task,
            scratch,
        })
    }

    /// OS process id, while the process is running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Close the output pipe, wait for the encoder to exit and remove the input.
    ///
    /// The wait observes `ctx`: on cancellation or deadline the encoder is
    /// killed as in [`abort`](Self::abort) and the interruption is returned.
    /// A nonzero exit is a runtime error even if output was already delivered.
    pub async fn close(mut self, ctx: &RequestContext) -> MediaResult<()> {
        drop(self.stdout.take());

        let waited = ctx
            .run(Stage::Streaming, async {
                self.child.wait().await.map_err(MediaError::from)
            })
            .await;
        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Encoder did not exit after closing its output");
                self.abort().await;
                return Err(e);
            }
        };

        let stderr = collect_stderr(self.stderr_task.take()).await;
        if let Err(e) = self.scratch.remove().await {
            warn!("Failed to remove transcode input: {}", e);
        }

        if status.success() {
            debug!("Transcode finished");
            return Ok(());
        }

        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        warn!(
            status = %code,
            stderr = stderr.as_deref().unwrap_or(""),
            "Encoder exited with failure"
        );
        Err(MediaError::transcode_runtime(
            format!("encoder exited with status {}", code),
            stderr,
            status.code(),
        ))
    }

    /// Kill the encoder, wait for it to exit and remove the input.
    pub async fn abort(mut self) {
        drop(self.stdout.take());

        if let Err(e) = self.child.start_kill() {
            debug!("Encoder already exited: {}", e);
        }
        if let Err(e) = self.child.wait().await {
            warn!("Failed to reap encoder: {}", e);
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
        if let Err(e) = self.scratch.remove().await {
            warn!("Failed to remove transcode input: {}", e);
        }
        info!("Transcode aborted");
    }
}

impl AsyncRead for TranscodeStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.stdout.as_mut() {
            Some(stdout) => Pin::new(stdout).poll_read(cx, buf),
            None => Poll::Ready(Ok(())),
        }
    }
}

/// Read stderr to EOF so the encoder never blocks on a full pipe.
async fn drain_stderr(stderr: ChildStderr) -> String {
    let mut lines = BufReader::new(stderr).lines();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    Vec::from(tail).join("\n")
}

async fn collect_stderr(task: Option<JoinHandle<String>>) -> Option<String> {
    let task = task?;
    match tokio::time::timeout(STDERR_DRAIN_TIMEOUT, task).await {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}
