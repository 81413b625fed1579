//! Range-capable HTTP fetcher.
//!
//! Probes the media host with a `HEAD` request, then performs exactly one
//! `GET`: ranged when the host advertises byte ranges and a length, plain
//! otherwise. The body is streamed chunk by chunk into the destination file.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::context::{RequestContext, Stage};
use crate::error::{MediaError, MediaResult};
use crate::range::ByteRange;

/// User agent sent with every media request.
pub const USER_AGENT: &str = concat!("clipr/", env!("CARGO_PKG_VERSION"));

/// Whether the host served a byte window or the whole asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Partial,
    Full,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Partial => "partial",
            FetchMode::Full => "full",
        }
    }
}

/// Result of a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub mode: FetchMode,
    pub bytes_written: u64,
}

/// What the `HEAD` probe learned about the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub accepts_ranges: bool,
    pub content_length: Option<u64>,
}

impl ProbeResult {
    /// Ranged fetch requires both byte-range support and a known length.
    pub fn supports_partial(&self) -> bool {
        self.accepts_ranges && self.content_length.is_some_and(|len| len > 0)
    }
}

/// HTTP fetcher shared across requests. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpRangeFetcher {
    client: Client,
}

impl HttpRangeFetcher {
    /// Build a fetcher with its own client.
    pub fn new(connect_timeout: Duration) -> MediaResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| MediaError::fetch(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Probe the asset for range support and length.
    pub async fn probe(&self, url: &str) -> MediaResult<ProbeResult> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| MediaError::fetch(format!("probe request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MediaError::fetch(format!(
                "probe returned status {}",
                response.status()
            )));
        }

        let headers = response.headers();
        let accepts_ranges = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').any(|unit| unit.trim().eq_ignore_ascii_case("bytes")))
            .unwrap_or(false);
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        Ok(ProbeResult {
            accepts_ranges,
            content_length,
        })
    }

    /// Fetch `range` of `url` (or the whole asset) into `dest`.
    ///
    /// `dest` is removed on any failure, cancellation or timeout.
    pub async fn fetch_segment(
        &self,
        ctx: &RequestContext,
        url: &str,
        range: ByteRange,
        dest: &Path,
    ) -> MediaResult<FetchOutcome> {
        let guard = PartialFile::new(dest);

        let outcome = ctx
            .run(Stage::Fetching, async {
                let probe = self.probe(url).await?;
                debug!(
                    accepts_ranges = probe.accepts_ranges,
                    content_length = ?probe.content_length,
                    "Probed media host"
                );

                match probe.content_length {
                    Some(total) if probe.supports_partial() => {
                        self.fetch_range(url, range.clamp_to(total), dest).await
                    }
                    _ => self.fetch_full(url, dest).await,
                }
            })
            .await?;

        guard.keep();

        metrics::counter!("clipr_fetch_bytes_total", "mode" => outcome.mode.as_str())
            .increment(outcome.bytes_written);
        info!(
            mode = outcome.mode.as_str(),
            bytes = outcome.bytes_written,
            "Fetched media segment"
        );

        Ok(outcome)
    }

    async fn fetch_range(
        &self,
        url: &str,
        range: ByteRange,
        dest: &Path,
    ) -> MediaResult<FetchOutcome> {
        debug!(range = %range, "Requesting byte range");

        let response = self
            .client
            .get(url)
            .header(RANGE, range.header_value())
            .send()
            .await
            .map_err(|e| MediaError::fetch(format!("range request failed: {}", e)))?;

        if response.status() != StatusCode::PARTIAL_CONTENT {
            return Err(MediaError::fetch(format!(
                "expected 206 Partial Content, got {}",
                response.status()
            )));
        }

        let bytes_written = write_body(response, dest).await?;
        Ok(FetchOutcome {
            mode: FetchMode::Partial,
            bytes_written,
        })
    }

    async fn fetch_full(&self, url: &str, dest: &Path) -> MediaResult<FetchOutcome> {
        debug!("Host does not support ranges, fetching full asset");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::fetch(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MediaError::fetch(format!(
                "download returned status {}",
                response.status()
            )));
        }

        let bytes_written = write_body(response, dest).await?;
        Ok(FetchOutcome {
            mode: FetchMode::Full,
            bytes_written,
        })
    }
}

async fn write_body(response: Response, dest: &Path) -> MediaResult<u64> {
    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let data = chunk.map_err(|e| MediaError::fetch(format!("body read failed: {}", e)))?;
        file.write_all(&data).await?;
        written += data.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Removes a partially written file unless the fetch completed.
struct PartialFile<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpRangeFetcher {
        HttpRangeFetcher::new(Duration::from_secs(5)).unwrap()
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Duration::from_secs(30))
    }

    async fn mount_head(server: &MockServer, ranges: bool, len: usize) {
        let mut template = ResponseTemplate::new(200)
            .insert_header("Content-Length", len.to_string().as_str())
            .set_body_bytes(vec![0u8; len]);
        if ranges {
            template = template.insert_header("Accept-Ranges", "bytes");
        }
        Mock::given(method("HEAD"))
            .and(path("/video.mp4"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_partial_fetch_sends_range() {
        let server = MockServer::start().await;
        mount_head(&server, true, 1000).await;
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .and(header("Range", "bytes=100-199"))
            .and(header("User-Agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![7u8; 100]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        let url = format!("{}/video.mp4", server.uri());

        let outcome = fetcher()
            .fetch_segment(&ctx(), &url, ByteRange::new(100, 199), &dest)
            .await
            .unwrap();

        assert_eq!(outcome.mode, FetchMode::Partial);
        assert_eq!(outcome.bytes_written, 100);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![7u8; 100]);
    }

    #[tokio::test]
    async fn test_range_clamped_to_content_length() {
        let server = MockServer::start().await;
        mount_head(&server, true, 500).await;
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .and(header("Range", "bytes=400-499"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(vec![1u8; 100]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        let url = format!("{}/video.mp4", server.uri());

        let outcome = fetcher()
            .fetch_segment(&ctx(), &url, ByteRange::new(400, 5_000), &dest)
            .await
            .unwrap();
        assert_eq!(outcome.bytes_written, 100);
    }

    #[tokio::test]
    async fn test_full_status_on_ranged_get_is_error() {
        let server = MockServer::start().await;
        mount_head(&server, true, 1000).await;
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1000]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        let url = format!("{}/video.mp4", server.uri());

        let err = fetcher()
            .fetch_segment(&ctx(), &url, ByteRange::new(0, 99), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Fetch { .. }));
        assert!(err.to_string().contains("206"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_falls_back_to_full_download() {
        let server = MockServer::start().await;
        mount_head(&server, false, 300).await;
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3u8; 300]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        let url = format!("{}/video.mp4", server.uri());

        let outcome = fetcher()
            .fetch_segment(&ctx(), &url, ByteRange::new(0, 99), &dest)
            .await
            .unwrap();

        assert_eq!(outcome.mode, FetchMode::Full);
        assert_eq!(outcome.bytes_written, 300);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 300);
    }

    #[tokio::test]
    async fn test_probe_failure_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        let url = format!("{}/video.mp4", server.uri());

        let err = fetcher()
            .fetch_segment(&ctx(), &url, ByteRange::new(0, 99), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Fetch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_cancel_removes_partial_file() {
        let server = MockServer::start().await;
        mount_head(&server, false, 10).await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0u8; 10])
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("segment.input");
        std::fs::write(&dest, b"stale").unwrap();
        let url = format!("{}/video.mp4", server.uri());

        let ctx = ctx();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let err = fetcher()
            .fetch_segment(&ctx, &url, ByteRange::new(0, 9), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
        assert!(!dest.exists());
    }
}
