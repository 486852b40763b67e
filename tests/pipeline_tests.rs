//! パイプライン統合テスト
//!
//! インメモリのプラットフォームフェイクに対してフルランを実行し、
//! 取得・分類・集計の不変条件を検証する。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use kansei::api::models::{Channel, ChannelId, Page, PageCursor, Video, VideoId};
use kansei::api::resolver::UNKNOWN_CHANNEL;
use kansei::{
    AnalysisConfig, FetchBounds, InsightPipeline, LexiconClassifier, PipelineError, PlatformError,
    SentimentLabel, SentimentStrategy, VideoPlatform,
};

/// 動画1本分のスクリプト
#[derive(Clone)]
struct VideoScript {
    month: u32,
    views: u64,
    likes: u64,
    /// Ok: コメントテキスト列 / Err: コメント取得を失敗させるメッセージ
    comments: Result<Vec<&'static str>, &'static str>,
}

/// テスト用プラットフォームフェイク
struct FakePlatform {
    channel_id: ChannelId,
    channel_name: Option<&'static str>,
    videos: Vec<(VideoId, VideoScript)>,
    /// コメント一覧の呼び出し回数（同時実行の観測用）
    comment_calls: Mutex<u32>,
    quota_exhausted_on_comments: bool,
}

impl FakePlatform {
    fn new(videos: Vec<(&'static str, VideoScript)>) -> Self {
        Self {
            channel_id: ChannelId("UCfake".to_string()),
            channel_name: Some("Fake Creator"),
            videos: videos
                .into_iter()
                .map(|(id, script)| (VideoId(id.to_string()), script))
                .collect(),
            comment_calls: Mutex::new(0),
            quota_exhausted_on_comments: false,
        }
    }

    fn script(&self, id: &VideoId) -> Option<&VideoScript> {
        self.videos
            .iter()
            .find(|(vid, _)| vid == id)
            .map(|(_, script)| script)
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn lookup_channel(&self, id: &ChannelId) -> Result<Channel, PlatformError> {
        match self.channel_name {
            Some(name) => Ok(Channel {
                id: id.clone(),
                display_name: name.to_string(),
            }),
            None => Err(PlatformError::not_found(format!("channel '{id}'"))),
        }
    }

    async fn lookup_channel_by_handle(&self, handle: &str) -> Result<Channel, PlatformError> {
        if handle == "fakecreator" {
            return Ok(Channel {
                id: self.channel_id.clone(),
                display_name: "Fake Creator".to_string(),
            });
        }
        Err(PlatformError::not_found(format!("handle '@{handle}'")))
    }

    async fn channel_for_video(&self, id: &VideoId) -> Result<ChannelId, PlatformError> {
        if self.videos.iter().any(|(vid, _)| vid == id) {
            return Ok(self.channel_id.clone());
        }
        Err(PlatformError::not_found(format!("video '{id}'")))
    }

    async fn list_video_ids(
        &self,
        _channel: &ChannelId,
        page_size: u32,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<VideoId>, PlatformError> {
        // 2件ずつの固定ページング
        let start: usize = match cursor {
            Some(c) => c.0.parse().unwrap(),
            None => 0,
        };
        let end = (start + (page_size as usize).min(2)).min(self.videos.len());
        let items = self.videos[start..end]
            .iter()
            .map(|(id, _)| id.clone())
            .collect();
        let next = if end < self.videos.len() {
            Some(PageCursor(end.to_string()))
        } else {
            None
        };
        Ok(Page { items, next })
    }

    async fn list_comments(
        &self,
        video: &VideoId,
        _page_size: u32,
        _cursor: Option<&PageCursor>,
    ) -> Result<Page<String>, PlatformError> {
        *self.comment_calls.lock() += 1;
        if self.quota_exhausted_on_comments {
            return Err(PlatformError::QuotaExceeded {
                message: "quota exceeded".to_string(),
            });
        }
        let script = self
            .script(video)
            .ok_or_else(|| PlatformError::not_found(format!("video '{video}'")))?;
        match &script.comments {
            Ok(texts) => Ok(Page::exhausted(
                texts.iter().map(|s| s.to_string()).collect(),
            )),
            Err(message) => Err(PlatformError::Api {
                operation: "commentThreads.list".to_string(),
                code: 403,
                message: message.to_string(),
            }),
        }
    }

    async fn video_statistics(&self, ids: &[VideoId]) -> Result<Vec<Video>, PlatformError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.script(id).map(|script| Video {
                    id: id.clone(),
                    title: format!("video {id}"),
                    published_at: Utc
                        .with_ymd_and_hms(2024, script.month, 15, 12, 0, 0)
                        .unwrap(),
                    view_count: script.views,
                    like_count: script.likes,
                })
            })
            .collect())
    }
}

fn classifier() -> Arc<dyn SentimentStrategy> {
    Arc::new(LexiconClassifier::default())
}

fn pipeline_with(platform: FakePlatform, config: AnalysisConfig) -> InsightPipeline {
    InsightPipeline::new(Arc::new(platform), classifier(), config)
}

fn happy_videos() -> Vec<(&'static str, VideoScript)> {
    vec![
        (
            "vid-march",
            VideoScript {
                month: 3,
                views: 1200,
                likes: 40,
                comments: Ok(vec![
                    "I love this video so much",
                    "this editing is really great",
                    "ok", // 短すぎるため除外される
                ]),
            },
        ),
        (
            "vid-january",
            VideoScript {
                month: 1,
                views: 800,
                likes: 10,
                comments: Ok(vec!["I hate this, worst upload ever"]),
            },
        ),
        (
            "vid-december",
            VideoScript {
                month: 12,
                views: 300,
                likes: 5,
                comments: Ok(vec!["it is a video about cooking"]),
            },
        ),
    ]
}

#[tokio::test]
async fn test_full_run_produces_consistent_report() {
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), AnalysisConfig::default());
    let report = pipeline.run("UCfake").await.unwrap();

    assert_eq!(report.channel.display_name, "Fake Creator");
    assert_eq!(report.videos.len(), 3);
    assert_eq!(report.strategy, "lexicon");

    // 短いコメント1件を除いた4件が分類され、合計はラベル件数の和と一致する
    assert_eq!(report.comments.len(), 4);
    assert_eq!(report.tally.total(), 4);
    assert_eq!(report.tally.positive, 2);
    assert_eq!(report.tally.negative, 1);
    assert_eq!(report.tally.neutral, 1);
    assert!(report.warnings.is_clean());
}

#[tokio::test]
async fn test_monthly_buckets_are_calendar_ordered() {
    // 入力順は Mar, Jan, Dec。出力は Jan → Mar → Dec でなければならない。
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), AnalysisConfig::default());
    let report = pipeline.run("UCfake").await.unwrap();

    let keys: Vec<&str> = report
        .monthly_views
        .iter()
        .map(|b| b.month_key.as_str())
        .collect();
    assert_eq!(keys, vec!["Jan", "Mar", "Dec"]);

    let bucket_sum: u64 = report.monthly_views.iter().map(|b| b.total_views).sum();
    assert_eq!(bucket_sum, report.totals.total_views);
    assert_eq!(report.totals.total_views, 2300);
    assert_eq!(report.totals.total_likes, 55);
}

#[tokio::test]
async fn test_failing_video_does_not_poison_siblings() {
    // V2のコメント取得だけが失敗する。V1/V3は無傷で、警告が1件残る。
    let videos = vec![
        (
            "v1",
            VideoScript {
                month: 1,
                views: 10,
                likes: 0,
                comments: Ok(vec!["what a great tutorial"]),
            },
        ),
        (
            "v2",
            VideoScript {
                month: 2,
                views: 20,
                likes: 0,
                comments: Err("comments are disabled"),
            },
        ),
        (
            "v3",
            VideoScript {
                month: 3,
                views: 30,
                likes: 0,
                comments: Ok(vec!["I hate the background music"]),
            },
        ),
    ];
    let pipeline = pipeline_with(FakePlatform::new(videos), AnalysisConfig::default());
    let report = pipeline.run("UCfake").await.unwrap();

    assert_eq!(report.warnings.comment_fetch_failures, 1);
    assert_eq!(report.comments.len(), 2);
    let by_video: HashMap<&str, SentimentLabel> = report
        .comments
        .iter()
        .map(|c| (c.video_id.0.as_str(), c.label))
        .collect();
    assert_eq!(by_video["v1"], SentimentLabel::Positive);
    assert_eq!(by_video["v3"], SentimentLabel::Negative);
    assert!(!by_video.contains_key("v2"));
    // 統計は3本とも残る
    assert_eq!(report.videos.len(), 3);
}

#[tokio::test]
async fn test_quota_exhaustion_aborts_the_run() {
    let mut platform = FakePlatform::new(happy_videos());
    platform.quota_exhausted_on_comments = true;
    let pipeline = pipeline_with(platform, AnalysisConfig::default());

    let error = pipeline.run("UCfake").await.unwrap_err();
    assert!(matches!(error, PipelineError::Fetch(_)));
}

#[tokio::test]
async fn test_unknown_channel_name_falls_back_to_sentinel() {
    // チャンネルIDでの実行中、表示名の取得失敗はランを止めない。
    let mut platform = FakePlatform::new(happy_videos());
    platform.channel_name = None;
    let pipeline = pipeline_with(platform, AnalysisConfig::default());

    let report = pipeline.run("UCfake").await.unwrap();
    assert_eq!(report.channel.display_name, UNKNOWN_CHANNEL);
    assert_eq!(report.tally.total(), 4);
}

#[tokio::test]
async fn test_handle_input_resolves_through_handle_lookup() {
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), AnalysisConfig::default());
    let report = pipeline.run("@fakecreator").await.unwrap();
    assert_eq!(report.channel.id.0, "UCfake");
    assert_eq!(report.channel.display_name, "Fake Creator");
}

#[tokio::test]
async fn test_video_url_input_resolves_owning_channel() {
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), AnalysisConfig::default());
    let report = pipeline
        .run("https://www.youtube.com/watch?v=vid-march")
        .await
        .unwrap();
    assert_eq!(report.channel.id.0, "UCfake");
}

#[tokio::test]
async fn test_unresolvable_handle_is_fatal() {
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), AnalysisConfig::default());
    let error = pipeline.run("@nobody").await.unwrap_err();
    assert!(matches!(error, PipelineError::Resolve(_)));
}

#[tokio::test]
async fn test_max_videos_bound_limits_the_working_set() {
    let config = AnalysisConfig {
        bounds: FetchBounds {
            max_videos: 2,
            max_comments_per_video: 50,
        },
        ..AnalysisConfig::default()
    };
    let pipeline = pipeline_with(FakePlatform::new(happy_videos()), config);
    let report = pipeline.run("UCfake").await.unwrap();

    // 最新2本（入力順の先頭2本）のみが対象になる
    assert_eq!(report.videos.len(), 2);
    let ids: Vec<&str> = report.videos.iter().map(|v| v.id.0.as_str()).collect();
    assert_eq!(ids, vec!["vid-march", "vid-january"]);
}

#[tokio::test]
async fn test_max_classified_truncates_without_sampling() {
    let videos = vec![(
        "v1",
        VideoScript {
            month: 1,
            views: 10,
            likes: 0,
            comments: Ok(vec![
                "I love this one",
                "I hate this one",
                "it is a video",
                "really great work",
                "absolutely terrible audio",
            ]),
        },
    )];
    let config = AnalysisConfig {
        max_classified: 3,
        ..AnalysisConfig::default()
    };
    let pipeline = pipeline_with(FakePlatform::new(videos), config);
    let report = pipeline.run("UCfake").await.unwrap();

    // 先頭3件のみ分類される（サンプリングしない）
    assert_eq!(report.tally.total(), 3);
    assert_eq!(report.comments[0].text, "I love this one");
    assert_eq!(report.comments[2].text, "it is a video");
}
