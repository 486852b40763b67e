//! One user-triggered run, composed leaf to root:
//! resolve → fetch → classify → aggregate.
//!
//! Fatal errors abort the run, never the process; re-triggering with the same
//! inputs is always safe because every run recomputes from scratch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analytics::aggregator::{
    monthly_view_buckets, tally_labels, view_totals, ChannelReport, ClassifiedComment,
};
use crate::api::models::Comment;
use crate::api::resolver::resolve_channel;
use crate::api::youtube::{PlatformError, VideoPlatform};
use crate::config::AnalysisConfig;
use crate::fetcher::{FetchError, Fetcher};
use crate::sentiment::{filter_for_classification, SentimentStrategy};

/// Fatal failures of a run, per the error taxonomy: resolution failures and
/// required-listing failures. Everything recoverable is downgraded to
/// warnings inside the run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Failed to resolve input")]
    Resolve(#[from] PlatformError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The comment-sentiment insight pipeline.
///
/// Both collaborators are constructed once at process start and injected:
/// the platform client is cheap but shared, the classifier may carry an
/// expensive pretrained model. Neither is mutated after construction.
pub struct InsightPipeline {
    platform: Arc<dyn VideoPlatform>,
    classifier: Arc<dyn SentimentStrategy>,
    config: AnalysisConfig,
}

impl InsightPipeline {
    pub fn new(
        platform: Arc<dyn VideoPlatform>,
        classifier: Arc<dyn SentimentStrategy>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            platform,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Execute one run for the given raw input (channel ID, handle or URL).
    pub async fn run(&self, raw_input: &str) -> Result<ChannelReport, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, input = raw_input, "🔄 starting insight run");

        let channel = resolve_channel(self.platform.as_ref(), raw_input).await?;
        info!(channel = %channel.display_name, channel_id = %channel.id, "📺 resolved channel");

        let fetcher = Fetcher::new(Arc::clone(&self.platform), self.config.bounds)
            .with_comment_concurrency(self.config.comment_concurrency);

        let video_ids = fetcher.fetch_video_ids(&channel.id).await?;
        let videos = fetcher.fetch_statistics(&video_ids).await?;
        let comments_by_video = fetcher.fetch_comments(&video_ids).await?;

        // Flatten in video order so repeated runs see a stable comment order
        // regardless of which concurrent fetch finished first.
        let mut comments: Vec<Comment> = Vec::new();
        for video_id in &video_ids {
            if let Some(entries) = comments_by_video.get(video_id) {
                comments.extend(entries.iter().cloned());
            }
        }
        info!(
            videos = videos.len(),
            comments = comments.len(),
            "✅ fetch complete"
        );

        let candidates = filter_for_classification(
            &comments,
            self.config.min_comment_chars,
            self.config.max_classified,
        );
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let labels = self.classifier.classify(&texts);
        debug_assert_eq!(labels.len(), candidates.len());

        let mut classified: Vec<ClassifiedComment> = Vec::with_capacity(candidates.len());
        let mut skips: u32 = 0;
        for (comment, label) in candidates.iter().zip(labels) {
            match label {
                Some(label) => classified.push(ClassifiedComment {
                    video_id: comment.video_id.clone(),
                    text: comment.text.clone(),
                    label,
                }),
                None => skips += 1,
            }
        }
        if skips > 0 {
            warn!(skips, "some comments could not be classified");
            fetcher.count_classification_skips(skips);
        }

        let tally = tally_labels(classified.iter().map(|c| c.label));
        let report = ChannelReport {
            run_id,
            generated_at: Utc::now(),
            channel,
            tally,
            monthly_views: monthly_view_buckets(&videos),
            totals: view_totals(&videos),
            videos,
            comments: classified,
            strategy: self.classifier.name().to_string(),
            warnings: fetcher.warnings(),
        };

        info!(
            run_id = %run_id,
            classified = report.tally.total(),
            positive = report.tally.positive,
            neutral = report.tally.neutral,
            negative = report.tally.negative,
            "📊 insight run complete"
        );
        Ok(report)
    }
}
