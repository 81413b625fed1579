//! Clip orchestration.
//!
//! Runs one clip request through validation, metadata resolution, the
//! duration re-check, the ranged fetch and transcoder start-up, all under a
//! single [`RequestContext`]. The resulting [`ClipJob`] is turned into a
//! streaming response body by [`ClipJob::into_body`].

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use futures::stream;
use tokio::io::AsyncReadExt;
use tokio_util::sync::DropGuard;
use tracing::{debug, error, info, Instrument, Span};

use clipr_media::{presets, range, MediaError, RequestContext, ScratchFile, Stage, TranscodeStream};
use clipr_models::{ClipRequest, ClipSpec};

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

/// Read size for forwarding encoder output.
const CHUNK_SIZE: usize = 64 * 1024;

/// A clip whose encoder is running and ready to be streamed.
#[derive(Debug)]
pub struct ClipJob {
    pub spec: ClipSpec,
    pub ctx: RequestContext,
    pub stream: TranscodeStream,
}

/// Validate `request` and drive it up to a running transcode.
pub async fn start_clip(state: &AppState, request: ClipRequest) -> ApiResult<ClipJob> {
    // One snapshot for both duration checks.
    let config = Arc::clone(&state.config);

    let spec = ClipSpec::validate(request, config.max_clip_duration_secs)?;
    metrics::record_clip_started(spec.platform());
    info!(
        url = %spec.source_url(),
        start = spec.start_secs(),
        end = spec.end_secs(),
        platform = %spec.platform(),
        quality = %spec.quality(),
        "Validated clip request"
    );

    let ctx = RequestContext::new(config.request_budget());

    let started = Instant::now();
    let metadata = state.resolver.resolve(&ctx, spec.source_url()).await?;
    record_stage(Stage::Resolving, started);

    spec.check_duration(config.max_clip_duration_secs)?;

    let window = range::estimate(&metadata, spec.start_secs(), spec.duration_secs());
    debug!(range = %window, bytes = window.byte_count(), "Estimated byte window");

    let scratch = ScratchFile::new_in(&config.scratch_dir);
    let started = Instant::now();
    let outcome = state
        .fetcher
        .fetch_segment(&ctx, &metadata.direct_fetch_url, window, scratch.path())
        .await?;
    record_stage(Stage::Fetching, started);
    metrics::record_fetch_mode(outcome.mode.as_str());

    let options = spec.processing_options();
    let preset = presets::get(&options.platform);
    let started = Instant::now();
    let stream = state
        .transcoder
        .start(&ctx, scratch, &options, &preset)
        .await?;
    record_stage(Stage::Transcoding, started);

    Ok(ClipJob { spec, ctx, stream })
}

impl ClipJob {
    /// Turn the running transcode into a response body.
    ///
    /// Chunks are forwarded as they are read. At EOF the encoder is closed;
    /// a failure then ends the body with an error, since the status line has
    /// already been sent. Cancellation, the deadline, or dropping the body
    /// kills the encoder and removes its input.
    pub fn into_body(self) -> Body {
        let cancel_on_drop = self.ctx.token().clone().drop_guard();
        let state = BodyState {
            platform: self.spec.platform().to_string(),
            ctx: self.ctx,
            stream: self.stream,
            started: Instant::now(),
            span: Span::current(),
            _cancel_on_drop: cancel_on_drop,
        };

        let body = stream::unfold(Some(state), |state| {
            let span = state
                .as_ref()
                .map(|s| s.span.clone())
                .unwrap_or_else(Span::none);
            next_chunk(state).instrument(span)
        });

        Body::from_stream(body)
    }
}

struct BodyState {
    platform: String,
    ctx: RequestContext,
    stream: TranscodeStream,
    started: Instant,
    span: Span,
    _cancel_on_drop: DropGuard,
}

type Chunk = Result<Bytes, io::Error>;

async fn next_chunk(state: Option<BodyState>) -> Option<(Chunk, Option<BodyState>)> {
    let BodyState {
        platform,
        ctx,
        mut stream,
        started,
        span,
        _cancel_on_drop,
    } = state?;

    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let read = ctx
        .run(Stage::Streaming, async {
            stream.read_buf(&mut buf).await.map_err(MediaError::from)
        })
        .await;

    match read {
        Ok(0) => match stream.close(&ctx).await {
            Ok(()) => {
                record_stage(Stage::Streaming, started);
                metrics::record_clip_streamed(&platform);
                info!("Clip streamed");
                None
            }
            Err(e) => Some((Err(stream_failure(e)), None)),
        },
        Ok(_) => {
            let state = BodyState {
                platform,
                ctx,
                stream,
                started,
                span,
                _cancel_on_drop,
            };
            Some((Ok(buf.freeze()), Some(state)))
        }
        Err(e) => {
            stream.abort().await;
            Some((Err(stream_failure(e)), None))
        }
    }
}

fn stream_failure(e: MediaError) -> io::Error {
    error!(
        error = %e,
        kind = e.kind(),
        stderr = e.stderr().unwrap_or(""),
        "Clip stream failed after response started"
    );
    metrics::record_stream_failure(e.kind());
    io::Error::other(e.to_string())
}

fn record_stage(stage: Stage, started: Instant) {
    let elapsed = started.elapsed();
    info!(
        stage = stage.as_str(),
        duration_ms = elapsed.as_millis() as u64,
        "Stage complete"
    );
    metrics::record_stage_duration(stage.as_str(), elapsed.as_secs_f64());
}
