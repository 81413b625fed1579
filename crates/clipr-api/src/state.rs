//! Application state.

use std::sync::Arc;

use clipr_media::{
    FfmpegTranscoder, HttpRangeFetcher, MediaResult, MetadataResolver, Transcoder, YtDlpResolver,
};

use crate::config::ApiConfig;

/// Shared application state.
///
/// Everything here is read-only after startup and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub resolver: Arc<dyn MetadataResolver>,
    pub fetcher: HttpRangeFetcher,
    pub transcoder: Arc<dyn Transcoder>,
}

impl AppState {
    /// Create state backed by the configured yt-dlp and ffmpeg binaries.
    pub fn new(config: ApiConfig) -> MediaResult<Self> {
        let fetcher = HttpRangeFetcher::new(config.fetch_connect_timeout)?;
        let resolver = Arc::new(YtDlpResolver::new(&config.ytdlp_path));
        let transcoder = Arc::new(FfmpegTranscoder::new(&config.ffmpeg_path));
        Ok(Self::with_components(config, resolver, fetcher, transcoder))
    }

    /// Create state from explicit components.
    pub fn with_components(
        config: ApiConfig,
        resolver: Arc<dyn MetadataResolver>,
        fetcher: HttpRangeFetcher,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
            fetcher,
            transcoder,
        }
    }
}
