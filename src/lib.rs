pub mod analytics;
pub mod api;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod pipeline;
pub mod sentiment;

/// Crate-wide result alias for the binary/config boundary; domain modules
/// carry their own error enums.
pub type KanseiResult<T> = anyhow::Result<T>;

// Re-export the main error types for convenience
pub use api::youtube::PlatformError;
pub use fetcher::FetchError;
pub use pipeline::PipelineError;

// Re-export the core pipeline surface
pub use analytics::aggregator::{
    ChannelReport, ClassifiedComment, MonthlyViewBucket, SentimentTally, ViewTotals,
};
pub use analytics::export::{export_report, ExportFormat, ExportResult};
pub use api::models::{ApiKey, Channel, ChannelId, Comment, Video, VideoId};
pub use api::youtube::{VideoPlatform, YouTubeDataApi};
pub use config::{AnalysisConfig, AppConfig, ConfigManager, StrategyKind};
pub use fetcher::{FetchBounds, Fetcher, RunWarnings};
pub use logging::init_logging;
pub use pipeline::InsightPipeline;
pub use sentiment::{
    LexiconClassifier, ModelClassifier, SentimentLabel, SentimentStrategy, SequenceScorer,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_availability() {
        // Key types should be reachable from the crate root.
        let _label = SentimentLabel::Neutral;
        let _bounds = FetchBounds::default();
        let _tally = SentimentTally::default();
        let _config = AnalysisConfig::default();
    }

    #[test]
    fn test_error_types_re_exported() {
        let error = PlatformError::not_found("channel 'UCx'");
        assert!(matches!(error, PlatformError::NotFound { .. }));
    }
}
