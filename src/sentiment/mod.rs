//! コメント感情分類。
//!
//! 分類は2つの交換可能な戦略（辞書ベース / 学習済みモデル）を同一の
//! インターフェースで提供する。集計側は戦略を意識しない。

pub mod lexicon;
pub mod model;

pub use lexicon::LexiconClassifier;
pub use model::{ModelClassifier, ScoreError, SequenceScorer};

use serde::{Deserialize, Serialize};

use crate::api::models::Comment;

/// Trimmed comments at or below this length are not worth classifying.
pub const MIN_COMMENT_CHARS: usize = 5;

/// Default cap on comments classified per run. Classification cost is
/// proportional to comment volume, so the filtered list is truncated (never
/// sampled) at this bound. Observed caps in the wild range 300–500.
pub const DEFAULT_MAX_CLASSIFIED: usize = 300;

/// 感情ラベル（3クラス）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }

    pub fn all() -> [SentimentLabel; 3] {
        [
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
        ]
    }
}

/// 分類戦略の共通インターフェース。
///
/// `classify` returns one entry per input text. `None` marks a comment the
/// strategy had to skip; a skip never aborts the batch. Classification is a
/// pure function of the text given a fixed configuration.
pub trait SentimentStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify(&self, texts: &[String]) -> Vec<Option<SentimentLabel>>;
}

/// Apply the length filter and the classification cap.
///
/// Filtering happens before the cap so the cap counts classifiable comments,
/// and the cap truncates rather than samples.
pub fn filter_for_classification<'a>(
    comments: &'a [Comment],
    min_chars: usize,
    max_classified: usize,
) -> Vec<&'a Comment> {
    comments
        .iter()
        .filter(|comment| comment.text.trim().chars().count() > min_chars)
        .take(max_classified)
        .collect()
}
