//! Bounded collection of videos, statistics and comments for one run.
//!
//! All listing endpoints are cursor-paginated: a page carries items plus an
//! opaque continuation token, and an absent token means the listing is
//! exhausted. The loops here always forward the newest token and always stop
//! on an absent one.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::models::{ChannelId, Comment, PageCursor, Video, VideoId};
use crate::api::youtube::{PlatformError, VideoPlatform, STATS_BATCH_LIMIT};

/// How many per-video comment fetches may be in flight at once.
pub const DEFAULT_COMMENT_CONCURRENCY: usize = 5;

/// Per-run bounds on the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBounds {
    /// Videos to analyze, newest first (≤ 50).
    pub max_videos: usize,
    /// Top-level comments per video (≤ 100).
    pub max_comments_per_video: usize,
}

impl Default for FetchBounds {
    fn default() -> Self {
        Self {
            max_videos: 10,
            max_comments_per_video: 50,
        }
    }
}

impl FetchBounds {
    /// Clamp the bounds to the ranges the API supports.
    pub fn clamped(self) -> Self {
        Self {
            max_videos: self.max_videos.min(50),
            max_comments_per_video: self.max_comments_per_video.min(100),
        }
    }
}

/// Counters for recoverable failures observed during a run.
///
/// Recoverable failures are logged where they happen, but they must also stay
/// countable so a caller can tell a clean run from a degraded one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunWarnings {
    /// Videos whose comment listing failed (e.g. comments disabled).
    pub comment_fetch_failures: u32,
    /// Statistics batches the API rejected.
    pub stats_batch_failures: u32,
    /// Comments the classifier skipped.
    pub classification_skips: u32,
}

impl RunWarnings {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Fatal fetch failures. These abort the current run (never the process);
/// recoverable per-item failures are downgraded to [`RunWarnings`] instead.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Failed to list videos for channel '{channel}'")]
    VideoListing {
        channel: ChannelId,
        #[source]
        source: PlatformError,
    },

    #[error("Quota exhausted during {operation}")]
    QuotaExhausted {
        operation: String,
        #[source]
        source: PlatformError,
    },
}

/// Collects the working set from a [`VideoPlatform`].
///
/// The platform handle is created once per process and shared read-only; the
/// fetcher itself only owns warning counters.
pub struct Fetcher {
    platform: Arc<dyn VideoPlatform>,
    bounds: FetchBounds,
    comment_concurrency: usize,
    warnings: Mutex<RunWarnings>,
}

impl Fetcher {
    pub fn new(platform: Arc<dyn VideoPlatform>, bounds: FetchBounds) -> Self {
        Self {
            platform,
            bounds: bounds.clamped(),
            comment_concurrency: DEFAULT_COMMENT_CONCURRENCY,
            warnings: Mutex::new(RunWarnings::default()),
        }
    }

    pub fn with_comment_concurrency(mut self, concurrency: usize) -> Self {
        self.comment_concurrency = concurrency.max(1);
        self
    }

    pub fn bounds(&self) -> FetchBounds {
        self.bounds
    }

    /// Snapshot of the recoverable failures seen so far.
    pub fn warnings(&self) -> RunWarnings {
        *self.warnings.lock()
    }

    pub(crate) fn count_classification_skips(&self, skips: u32) {
        self.warnings.lock().classification_skips += skips;
    }

    /// The channel's most recent video IDs, up to `max_videos`.
    ///
    /// A failure here leaves the run with nothing to analyze, so it is fatal.
    pub async fn fetch_video_ids(&self, channel: &ChannelId) -> Result<Vec<VideoId>, FetchError> {
        let mut collected: Vec<VideoId> = Vec::new();
        let mut cursor: Option<PageCursor> = None;

        while collected.len() < self.bounds.max_videos {
            let remaining = self.bounds.max_videos - collected.len();
            let page = self
                .platform
                .list_video_ids(channel, remaining.min(50) as u32, cursor.as_ref())
                .await
                .map_err(|source| FetchError::VideoListing {
                    channel: channel.clone(),
                    source,
                })?;

            collected.extend(page.items);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        collected.truncate(self.bounds.max_videos);
        debug!(channel = %channel, videos = collected.len(), "video listing complete");
        Ok(collected)
    }

    /// Statistics snapshots for the given IDs, chunked at the API's 50-ID
    /// batch limit and merged back in input order.
    ///
    /// A rejected batch is a partial-data condition: it is logged, counted,
    /// and its videos are omitted rather than aborting the run.
    pub async fn fetch_statistics(&self, ids: &[VideoId]) -> Result<Vec<Video>, FetchError> {
        let mut by_id: HashMap<VideoId, Video> = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(STATS_BATCH_LIMIT) {
            match self.platform.video_statistics(chunk).await {
                Ok(videos) => {
                    for video in videos {
                        by_id.insert(video.id.clone(), video);
                    }
                }
                Err(error) if error.is_fatal_everywhere() => {
                    return Err(FetchError::QuotaExhausted {
                        operation: "videos.list".to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    warn!(
                        batch_size = chunk.len(),
                        first_id = %chunk[0],
                        error = %error,
                        "statistics batch failed, omitting its videos"
                    );
                    self.warnings.lock().stats_batch_failures += 1;
                }
            }
        }

        // Input order is the API's date order; keep it.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Top-level comments for every video, fetched concurrently with a
    /// bounded worker pool. Attribution to the owning video is preserved; no
    /// ordering is guaranteed across videos.
    ///
    /// A video whose comment listing fails gets an empty list and a warning;
    /// only quota exhaustion is escalated.
    pub async fn fetch_comments(
        &self,
        ids: &[VideoId],
    ) -> Result<HashMap<VideoId, Vec<Comment>>, FetchError> {
        let results: Vec<(VideoId, Result<Vec<String>, PlatformError>)> =
            stream::iter(ids.iter().cloned())
                .map(|id| async move {
                    let result = self.fetch_comments_for_video(&id).await;
                    (id, result)
                })
                .buffer_unordered(self.comment_concurrency)
                .collect()
                .await;

        let mut comments: HashMap<VideoId, Vec<Comment>> = HashMap::with_capacity(ids.len());
        for (video_id, result) in results {
            match result {
                Ok(texts) => {
                    let entries = texts
                        .into_iter()
                        .map(|text| Comment {
                            video_id: video_id.clone(),
                            text,
                        })
                        .collect();
                    comments.insert(video_id, entries);
                }
                Err(error) if error.is_fatal_everywhere() => {
                    return Err(FetchError::QuotaExhausted {
                        operation: "commentThreads.list".to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    warn!(
                        video_id = %video_id,
                        error = %error,
                        "comment listing failed, continuing with empty list"
                    );
                    self.warnings.lock().comment_fetch_failures += 1;
                    comments.insert(video_id, Vec::new());
                }
            }
        }

        Ok(comments)
    }

    async fn fetch_comments_for_video(
        &self,
        video: &VideoId,
    ) -> Result<Vec<String>, PlatformError> {
        let mut collected: Vec<String> = Vec::new();
        let mut cursor: Option<PageCursor> = None;

        while collected.len() < self.bounds.max_comments_per_video {
            let remaining = self.bounds.max_comments_per_video - collected.len();
            let page = self
                .platform
                .list_comments(video, remaining.min(100) as u32, cursor.as_ref())
                .await?;

            collected.extend(page.items);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        collected.truncate(self.bounds.max_comments_per_video);
        Ok(collected)
    }
}
