//! YouTube Data API v3 client.
//!
//! The pipeline consumes exactly four call shapes: `channels.list`,
//! `search.list`, `commentThreads.list` and `videos.list`. They are exposed
//! behind the [`VideoPlatform`] trait so the fetcher and pipeline can be
//! exercised against an in-memory fake.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::models::{
    ApiErrorEnvelope, ApiKey, Channel, ChannelId, ChannelListResponse, CommentThreadListResponse,
    Page, PageCursor, SearchListResponse, Video, VideoId, VideoListResponse,
};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum number of video IDs `videos.list` accepts per call.
pub const STATS_BATCH_LIMIT: usize = 50;

#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("Request failed")]
    Request(#[from] reqwest::Error),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("API quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("API error {code} during {operation}: {message}")]
    Api {
        operation: String,
        code: u16,
        message: String,
    },

    #[error("Failed to parse response from {operation}")]
    Parse {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PlatformError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Fatal errors must abort the run even where the failure site itself is
    /// best-effort (quota rejections are non-transient within a session).
    pub fn is_fatal_everywhere(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// The external video platform, reduced to the call shapes this crate needs.
///
/// Implementations hold no mutable state and may be shared read-only across
/// concurrent fetch tasks.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Resolve a channel by its literal ID.
    async fn lookup_channel(&self, id: &ChannelId) -> Result<Channel, PlatformError>;

    /// Resolve a channel by handle (`@name`, without the leading `@`).
    async fn lookup_channel_by_handle(&self, handle: &str) -> Result<Channel, PlatformError>;

    /// Find the channel that owns a video.
    async fn channel_for_video(&self, id: &VideoId) -> Result<ChannelId, PlatformError>;

    /// One page of the channel's video IDs, ordered by date (newest first).
    async fn list_video_ids(
        &self,
        channel: &ChannelId,
        page_size: u32,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<VideoId>, PlatformError>;

    /// One page of top-level comment texts for a video.
    async fn list_comments(
        &self,
        video: &VideoId,
        page_size: u32,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<String>, PlatformError>;

    /// Statistics snapshots for up to [`STATS_BATCH_LIMIT`] video IDs.
    /// Callers are responsible for chunking larger sets.
    async fn video_statistics(&self, ids: &[VideoId]) -> Result<Vec<Video>, PlatformError>;
}

/// Reqwest-backed [`VideoPlatform`] implementation.
///
/// Constructed once at process start and shared; holds only the HTTP client
/// and the API key, so no teardown is required.
#[derive(Debug, Clone)]
pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base, e.g. to point at a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, resource: &str, query: &str) -> String {
        format!(
            "{}/{}?{}&key={}",
            self.base_url,
            resource,
            query,
            urlencoding::encode(self.api_key.as_str())
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
    ) -> Result<T, PlatformError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(map_api_error(operation, status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|source| PlatformError::Parse {
            operation: operation.to_string(),
            source,
        })
    }
}

/// Classify a non-2xx response into the error taxonomy.
fn map_api_error(operation: &str, status: u16, body: &str) -> PlatformError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.is_quota_error() => PlatformError::QuotaExceeded {
            message: envelope.error.message,
        },
        Ok(envelope) if envelope.error.code == 404 => PlatformError::not_found(operation),
        Ok(envelope) => PlatformError::Api {
            operation: operation.to_string(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => PlatformError::Api {
            operation: operation.to_string(),
            code: status,
            message: body.chars().take(200).collect(),
        },
    }
}

#[async_trait]
impl VideoPlatform for YouTubeDataApi {
    async fn lookup_channel(&self, id: &ChannelId) -> Result<Channel, PlatformError> {
        let url = self.url(
            "channels",
            &format!("part=snippet&id={}", urlencoding::encode(&id.0)),
        );
        let response: ChannelListResponse = self.get_json("channels.list", &url).await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::not_found(format!("channel '{}'", id)))?;
        Ok(Channel {
            id: ChannelId(item.id),
            display_name: item.snippet.title,
        })
    }

    async fn lookup_channel_by_handle(&self, handle: &str) -> Result<Channel, PlatformError> {
        let url = self.url(
            "channels",
            &format!("part=snippet&forHandle={}", urlencoding::encode(handle)),
        );
        let response: ChannelListResponse = self.get_json("channels.list", &url).await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::not_found(format!("handle '@{}'", handle)))?;
        Ok(Channel {
            id: ChannelId(item.id),
            display_name: item.snippet.title,
        })
    }

    async fn channel_for_video(&self, id: &VideoId) -> Result<ChannelId, PlatformError> {
        let url = self.url(
            "videos",
            &format!("part=snippet&id={}", urlencoding::encode(&id.0)),
        );
        let response: VideoListResponse = self.get_json("videos.list", &url).await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet.channel_id)
            .map(ChannelId)
            .ok_or_else(|| PlatformError::not_found(format!("video '{}'", id)))
    }

    async fn list_video_ids(
        &self,
        channel: &ChannelId,
        page_size: u32,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<VideoId>, PlatformError> {
        let mut query = format!(
            "part=id&channelId={}&order=date&type=video&maxResults={}",
            urlencoding::encode(&channel.0),
            page_size
        );
        if let Some(cursor) = cursor {
            query.push_str(&format!("&pageToken={}", urlencoding::encode(&cursor.0)));
        }
        let url = self.url("search", &query);
        let response: SearchListResponse = self.get_json("search.list", &url).await?;

        let items = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .map(VideoId)
            .collect();
        Ok(Page {
            items,
            next: response.next_page_token.map(PageCursor),
        })
    }

    async fn list_comments(
        &self,
        video: &VideoId,
        page_size: u32,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<String>, PlatformError> {
        let mut query = format!(
            "part=snippet&videoId={}&maxResults={}&textFormat=plainText",
            urlencoding::encode(&video.0),
            page_size
        );
        if let Some(cursor) = cursor {
            query.push_str(&format!("&pageToken={}", urlencoding::encode(&cursor.0)));
        }
        let url = self.url("commentThreads", &query);
        let response: CommentThreadListResponse =
            self.get_json("commentThreads.list", &url).await?;

        let items = response
            .items
            .into_iter()
            .map(|item| item.snippet.top_level_comment.snippet.text_display)
            .collect();
        Ok(Page {
            items,
            next: response.next_page_token.map(PageCursor),
        })
    }

    async fn video_statistics(&self, ids: &[VideoId]) -> Result<Vec<Video>, PlatformError> {
        debug_assert!(ids.len() <= STATS_BATCH_LIMIT);

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.0.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let url = self.url(
            "videos",
            &format!(
                "part=statistics,snippet&id={}",
                urlencoding::encode(&joined)
            ),
        );
        let response: VideoListResponse = self.get_json("videos.list", &url).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| item.into_video())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_encodes_values() {
        let api =
            YouTubeDataApi::new(ApiKey::new("k&ey".to_string())).with_base_url("http://localhost");
        let url = api.url("channels", "part=snippet&id=UC123");
        assert_eq!(
            url,
            "http://localhost/channels?part=snippet&id=UC123&key=k%26ey"
        );
    }

    #[test]
    fn test_map_api_error_quota() {
        let body =
            r#"{"error":{"code":403,"message":"quota up","errors":[{"reason":"quotaExceeded"}]}}"#;
        let error = map_api_error("search.list", 403, body);
        assert!(matches!(error, PlatformError::QuotaExceeded { .. }));
        assert!(error.is_fatal_everywhere());
    }

    #[test]
    fn test_map_api_error_not_found() {
        let body = r#"{"error":{"code":404,"message":"missing","errors":[{"reason":"channelNotFound"}]}}"#;
        let error = map_api_error("channels.list", 404, body);
        assert!(matches!(error, PlatformError::NotFound { .. }));
    }

    #[test]
    fn test_map_api_error_unparseable_body() {
        let error = map_api_error("videos.list", 500, "<html>oops</html>");
        match error {
            PlatformError::Api {
                code, operation, ..
            } => {
                assert_eq!(code, 500);
                assert_eq!(operation, "videos.list");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_messages_name_operation_and_identifier() {
        let error = PlatformError::not_found("channel 'UCabc'");
        assert_eq!(format!("{}", error), "channel 'UCabc' not found");
    }
}
