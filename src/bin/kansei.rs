use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use kansei::{
    export_report, init_logging, AnalysisConfig, ApiKey, ChannelReport, ConfigManager,
    ExportFormat, InsightPipeline, KanseiResult, LexiconClassifier, SentimentLabel,
    SentimentStrategy, StrategyKind, YouTubeDataApi,
};

/// YouTubeチャンネルのコメント感情分析CLI
#[derive(Parser, Debug)]
#[command(name = "kansei", version, about = "YouTube channel comment sentiment insights")]
struct Cli {
    /// チャンネルID、@ハンドル、または動画URL
    input: String,

    /// YouTube Data API キー
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// 分析対象とする動画数の上限
    #[arg(long)]
    max_videos: Option<usize>,

    /// 動画ごとに取得するコメント数の上限
    #[arg(long)]
    max_comments: Option<usize>,

    /// 分類戦略
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// 辞書ベース分類のしきい値
    #[arg(long)]
    threshold: Option<f64>,

    /// レポートのエクスポート形式
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// エクスポート先パス（省略時は kansei_report.<ext>）
    #[arg(long)]
    export_path: Option<PathBuf>,

    /// 設定ファイルのパス（省略時はXDG標準の場所）
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> KanseiResult<()> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new()?,
    };
    let mut config = config_manager.load_or_default();
    apply_cli_overrides(&mut config.analysis, &cli);

    let _log_guard = init_logging(&config.log)?;
    tracing::info!("🎬 Starting kansei - YouTube comment sentiment insights");

    let classifier: Arc<dyn SentimentStrategy> = match config.analysis.strategy {
        StrategyKind::Lexicon => {
            Arc::new(LexiconClassifier::new(config.analysis.lexicon_threshold))
        }
        StrategyKind::Model => {
            // モデル戦略はライブラリ利用者がSequenceScorerを注入する前提。
            anyhow::bail!(
                "the model strategy needs an embedded scorer backend; \
                 use --strategy lexicon or build the pipeline via the library API"
            );
        }
    };

    let platform = Arc::new(YouTubeDataApi::new(ApiKey::new(cli.api_key.clone())));
    let pipeline = InsightPipeline::new(platform, classifier, config.analysis.clone());

    let report = pipeline.run(&cli.input).await?;
    print_report(&report);

    if let Some(format) = cli.export {
        let path = cli.export_path.unwrap_or_else(|| {
            PathBuf::from(format!("kansei_report.{}", format.file_extension()))
        });
        let result = export_report(&report, format, &path)?;
        println!();
        println!(
            "💾 Exported {} comment rows to {}",
            result.exported_records, result.file_path
        );
    }

    tracing::info!("👋 kansei run finished");
    Ok(())
}

fn apply_cli_overrides(analysis: &mut AnalysisConfig, cli: &Cli) {
    if let Some(max_videos) = cli.max_videos {
        analysis.bounds.max_videos = max_videos;
    }
    if let Some(max_comments) = cli.max_comments {
        analysis.bounds.max_comments_per_video = max_comments;
    }
    if let Some(strategy) = cli.strategy {
        analysis.strategy = strategy;
    }
    if let Some(threshold) = cli.threshold {
        analysis.lexicon_threshold = threshold;
    }
    analysis.bounds = analysis.bounds.clamped();
}

fn print_report(report: &ChannelReport) {
    println!();
    println!("📺 {} ({})", report.channel.display_name, report.channel.id);
    println!(
        "   run {} / strategy: {} / generated {}",
        report.run_id,
        report.strategy,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();

    println!("感情分類 ({} comments classified):", report.tally.total());
    for label in SentimentLabel::all() {
        println!(
            "   {:<8} {:>6}  ({:>5.1}%)",
            label.as_str(),
            report.tally.count(label),
            report.tally.percentage(label)
        );
    }
    println!();

    println!("月別視聴数 (publication month of analyzed videos):");
    if report.monthly_views.is_empty() {
        println!("   (no videos)");
    }
    for bucket in &report.monthly_views {
        println!("   {:<4} {:>12}", bucket.month_key, bucket.total_views);
    }
    println!();

    println!(
        "合計: {} videos / {} views / {} likes",
        report.videos.len(),
        report.totals.total_views,
        report.totals.total_likes
    );

    if !report.warnings.is_clean() {
        println!();
        println!(
            "⚠️  warnings: {} comment fetch failures, {} stats batch failures, {} classification skips",
            report.warnings.comment_fetch_failures,
            report.warnings.stats_batch_failures,
            report.warnings.classification_skips
        );
    }
}
