//! 分類済みコメントと動画スナップショットの集計。
//!
//! 入力を変更せず、表示・エクスポート用の派生ビューのみを生成する。

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::models::{Channel, Video, VideoId};
use crate::fetcher::RunWarnings;
use crate::sentiment::SentimentLabel;

/// 月キー（1月〜12月、カレンダー順）
pub const MONTH_KEYS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// ラベル別のコメント件数。
///
/// 合計は実際に分類されたコメント数と常に一致する（フィルタ済み・
/// 上限適用後、スキップ分を除く）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentTally {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn count(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    /// 分類済みコメント総数（パーセンテージ表示の分母）。
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    pub fn percentage(&self, label: SentimentLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(label) as f64 * 100.0 / total as f64
    }
}

/// ラベル列から件数を集計。
pub fn tally_labels<I>(labels: I) -> SentimentTally
where
    I: IntoIterator<Item = SentimentLabel>,
{
    let mut tally = SentimentTally::default();
    for label in labels {
        tally.record(label);
    }
    tally
}

/// 月別視聴数バケット。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyViewBucket {
    /// 月番号（1〜12）
    pub month: u32,
    /// 月キー（"Jan".."Dec"）
    pub month_key: String,
    pub total_views: u64,
}

/// 動画を公開月でグループ化して視聴数を合算する。
///
/// 出力は常にカレンダー順（Jan→Dec）。辞書順ソートは集計欠陥として
/// 扱い、月番号キーで並べることで構造的に排除する。
pub fn monthly_view_buckets(videos: &[Video]) -> Vec<MonthlyViewBucket> {
    let mut by_month: BTreeMap<u32, u64> = BTreeMap::new();
    for video in videos {
        *by_month.entry(video.published_at.month()).or_insert(0) += video.view_count;
    }

    by_month
        .into_iter()
        .map(|(month, total_views)| MonthlyViewBucket {
            month,
            month_key: MONTH_KEYS[(month - 1) as usize].to_string(),
            total_views,
        })
        .collect()
}

/// スカラー合計値。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTotals {
    pub total_views: u64,
    pub total_likes: u64,
}

pub fn view_totals(videos: &[Video]) -> ViewTotals {
    ViewTotals {
        total_views: videos.iter().map(|v| v.view_count).sum(),
        total_likes: videos.iter().map(|v| v.like_count).sum(),
    }
}

/// 分類済みコメント1件（テーブル表示・CSVエクスポート用）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    pub video_id: VideoId,
    pub text: String,
    pub label: SentimentLabel,
}

/// 1回の実行結果。プレゼンテーション層はこの形のみを消費する。
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    /// 実行ID
    pub run_id: Uuid,
    /// 生成時刻
    pub generated_at: DateTime<Utc>,
    pub channel: Channel,
    /// 取得した動画スナップショット（API返却順のまま）
    pub videos: Vec<Video>,
    pub tally: SentimentTally,
    pub monthly_views: Vec<MonthlyViewBucket>,
    pub totals: ViewTotals,
    /// 分類済みコメントテーブル
    pub comments: Vec<ClassifiedComment>,
    /// 使用した分類戦略名
    pub strategy: String,
    /// 回復可能な失敗のカウンタ
    pub warnings: RunWarnings,
}
