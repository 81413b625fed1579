//! Per-request deadline and cancellation.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{MediaError, MediaResult};

/// Pipeline stage, used for timeout messages, logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolving,
    Fetching,
    Transcoding,
    Streaming,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolving => "resolve",
            Stage::Fetching => "fetch",
            Stage::Transcoding => "transcode",
            Stage::Streaming => "stream",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::Resolving => "resolving metadata",
            Stage::Fetching => "fetching segment",
            Stage::Transcoding => "starting transcode",
            Stage::Streaming => "streaming output",
        };
        f.write_str(text)
    }
}

/// Deadline plus cancellation signal shared by every stage of one request.
///
/// Clones share the same token, so cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Instant,
}

impl RequestContext {
    /// Create a context whose deadline is `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self::with_token(CancellationToken::new(), budget)
    }

    pub fn with_token(cancel: CancellationToken, budget: Duration) -> Self {
        Self {
            cancel,
            deadline: Instant::now() + budget,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `fut` until it completes, the token is cancelled, or the deadline passes.
    ///
    /// On cancellation or timeout `fut` is dropped before this returns. Hitting
    /// the deadline also cancels the token so sibling work stops.
    pub async fn run<T, F>(&self, stage: Stage, fut: F) -> MediaResult<T>
    where
        F: Future<Output = MediaResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(self.interruption(stage));
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.interruption(stage)),
            _ = tokio::time::sleep_until(self.deadline) => {
                self.cancel.cancel();
                Err(MediaError::Timeout { stage })
            }
            result = fut => result,
        }
    }

    /// The error to report for a stage interrupted by the token.
    pub fn interruption(&self, stage: Stage) -> MediaError {
        if Instant::now() >= self.deadline {
            MediaError::Timeout { stage }
        } else {
            MediaError::Cancelled
        }
    }
}
