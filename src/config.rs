//! アプリケーション設定管理モジュール。
//!
//! XDGディレクトリを使用した設定ファイルの永続化と管理を提供します。

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::fetcher::{FetchBounds, DEFAULT_COMMENT_CONCURRENCY};
use crate::sentiment::lexicon::DEFAULT_THRESHOLD;
use crate::sentiment::{DEFAULT_MAX_CLASSIFIED, MIN_COMMENT_CHARS};

/// 分類戦略の選択
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// 辞書ベース分類
    #[default]
    Lexicon,
    /// 学習済みモデル分類（SequenceScorer注入が必要）
    Model,
}

/// 分析設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 取得する動画数・コメント数の上限
    #[serde(default)]
    pub bounds: FetchBounds,
    /// 分類対象とする最小コメント長（トリム後、これ以下は除外）
    #[serde(default = "default_min_comment_chars")]
    pub min_comment_chars: usize,
    /// 1回の実行で分類するコメント数の上限（切り詰め、サンプリングなし）
    #[serde(default = "default_max_classified")]
    pub max_classified: usize,
    /// コメント取得の同時実行数
    #[serde(default = "default_comment_concurrency")]
    pub comment_concurrency: usize,
    /// 辞書ベース分類のしきい値。
    /// 元実装のバリアント間で 0 / 0.05 / 0.1 と揺れていたため設定値とする。
    #[serde(default = "default_lexicon_threshold")]
    pub lexicon_threshold: f64,
    /// 使用する分類戦略
    #[serde(default)]
    pub strategy: StrategyKind,
}

fn default_min_comment_chars() -> usize {
    MIN_COMMENT_CHARS
}

fn default_max_classified() -> usize {
    DEFAULT_MAX_CLASSIFIED
}

fn default_comment_concurrency() -> usize {
    DEFAULT_COMMENT_CONCURRENCY
}

fn default_lexicon_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bounds: FetchBounds::default(),
            min_comment_chars: default_min_comment_chars(),
            max_classified: default_max_classified(),
            comment_concurrency: default_comment_concurrency(),
            lexicon_threshold: default_lexicon_threshold(),
            strategy: StrategyKind::default(),
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// カスタムログディレクトリ（Noneの場合はXDGデフォルト使用）
    pub log_dir: Option<PathBuf>,
    /// ログレベル (trace/debug/info/warn/error)
    pub log_level: String,
    /// ファイル出力有効化
    pub enable_file_logging: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: "info".to_string(),
            enable_file_logging: false,
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 分析設定
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// ログ設定
    #[serde(default)]
    pub log: LogConfig,
}

/// 設定の読み込み・保存
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("dev", "sifyfy", "kansei")
            .context("failed to determine config directory")?;
        let config_dir = project_dirs.config_dir().to_path_buf();
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// 設定ファイルを読み込む。存在しない場合はデフォルトを返す。
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("failed to read config file: {}", self.config_path.display())
        })?;
        let config: AppConfig = toml::from_str(&contents).with_context(|| {
            format!("failed to parse config file: {}", self.config_path.display())
        })?;
        Ok(config)
    }

    /// 読み込み失敗時はデフォルト設定にフォールバック。
    pub fn load_or_default(&self) -> AppConfig {
        self.load_config().unwrap_or_else(|error| {
            warn!(error = %error, "設定読み込みエラー、デフォルト設定を使用");
            AppConfig::default()
        })
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.config_path, contents).with_context(|| {
            format!("failed to write config file: {}", self.config_path.display())
        })?;
        Ok(())
    }
}
