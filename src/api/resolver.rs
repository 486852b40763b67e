//! Input normalization.
//!
//! A run starts from one raw user string: a channel ID, an `@handle`, or a
//! video URL. URL recognition is pure string work; only the final channel
//! lookup touches the network.

use regex::Regex;
use tracing::warn;

use crate::api::models::{Channel, ChannelId, VideoId};
use crate::api::youtube::{PlatformError, VideoPlatform};

/// Sentinel display name used when the channel title cannot be resolved.
///
/// A missing channel name must never abort the rest of the run, so name
/// resolution is best-effort by policy.
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// What the raw input turned out to be, before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Channel(ChannelId),
    Handle(String),
    Video(VideoId),
}

pub fn extract_watch_video_id(raw: &str) -> Option<VideoId> {
    Regex::new(r"[?&]v=([A-Za-z0-9_-]{6,})")
        .unwrap()
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

pub fn extract_short_link_video_id(raw: &str) -> Option<VideoId> {
    Regex::new(r"youtu\.be/([A-Za-z0-9_-]{6,})")
        .unwrap()
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

/// Classify the raw input. Two URL shapes are recognized (`watch?v=` and the
/// `youtu.be` short link); `@handle` goes to handle lookup; anything else is
/// treated as a literal channel ID.
pub fn parse_input(raw: &str) -> ResolvedTarget {
    let trimmed = raw.trim();

    if let Some(video_id) = extract_watch_video_id(trimmed) {
        return ResolvedTarget::Video(video_id);
    }
    if let Some(video_id) = extract_short_link_video_id(trimmed) {
        return ResolvedTarget::Video(video_id);
    }
    if let Some(handle) = trimmed.strip_prefix('@') {
        return ResolvedTarget::Handle(handle.to_string());
    }
    ResolvedTarget::Channel(ChannelId(trimmed.to_string()))
}

/// Resolve the raw input to the channel the run will analyze.
///
/// A video URL is resolved to its owning channel first; a handle must resolve
/// or the run cannot proceed. For a literal channel ID the title lookup is
/// best-effort: on failure the run continues with [`UNKNOWN_CHANNEL`].
pub async fn resolve_channel(
    platform: &dyn VideoPlatform,
    raw: &str,
) -> Result<Channel, PlatformError> {
    match parse_input(raw) {
        ResolvedTarget::Handle(handle) => platform.lookup_channel_by_handle(&handle).await,
        ResolvedTarget::Video(video_id) => {
            let channel_id = platform.channel_for_video(&video_id).await?;
            Ok(lookup_name_best_effort(platform, channel_id).await)
        }
        ResolvedTarget::Channel(channel_id) => {
            Ok(lookup_name_best_effort(platform, channel_id).await)
        }
    }
}

async fn lookup_name_best_effort(platform: &dyn VideoPlatform, id: ChannelId) -> Channel {
    match platform.lookup_channel(&id).await {
        Ok(channel) => channel,
        Err(error) => {
            warn!(
                channel_id = %id,
                error = %error,
                "channels.list failed, continuing with fallback display name"
            );
            Channel {
                id,
                display_name: UNKNOWN_CHANNEL.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_url() {
        let target = parse_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            target,
            ResolvedTarget::Video(VideoId("dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_parse_watch_url_with_extra_params() {
        let target = parse_input("https://www.youtube.com/watch?list=PL1&v=dQw4w9WgXcQ&t=10s");
        assert_eq!(
            target,
            ResolvedTarget::Video(VideoId("dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_parse_short_link() {
        let target = parse_input("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            target,
            ResolvedTarget::Video(VideoId("dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_parse_handle() {
        let target = parse_input("@somecreator");
        assert_eq!(target, ResolvedTarget::Handle("somecreator".to_string()));
    }

    #[test]
    fn test_parse_literal_channel_id() {
        let target = parse_input("UC_x5XG1OV2P6uZZ5FSM9Ttw");
        assert_eq!(
            target,
            ResolvedTarget::Channel(ChannelId("UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string()))
        );
    }

    #[test]
    fn test_non_url_garbage_is_treated_as_channel_id() {
        // Anything that is not one of the two recognized URL shapes falls
        // through to a literal channel ID.
        let target = parse_input("https://example.com/something");
        assert_eq!(
            target,
            ResolvedTarget::Channel(ChannelId("https://example.com/something".to_string()))
        );
    }

    #[test]
    fn test_input_is_trimmed() {
        let target = parse_input("  UCabc  ");
        assert_eq!(target, ResolvedTarget::Channel(ChannelId("UCabc".to_string())));
    }
}
