//! 辞書ベースの感情分類エンジン。
//!
//! キーワード辞書・絵文字スコア・否定語・強調語から合成極性スコア
//! （-1.0〜1.0）を計算し、しきい値で3クラスに割り当てる。

use std::collections::{HashMap, HashSet};

use super::{SentimentLabel, SentimentStrategy};

/// Default decision threshold. Source dashboards disagreed on this value
/// (0 / 0.05 / 0.1 were all observed), so it is configuration, not a
/// constant: scores above `threshold` are Positive, below `-threshold`
/// Negative, the rest Neutral.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Contribution of one keyword hit to the raw score.
const KEYWORD_WEIGHT: f64 = 0.4;

/// Multiplier applied per detected intensity modifier.
const INTENSITY_STEP: f64 = 0.5;

/// 辞書ベース分類器
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    /// ポジティブキーワード辞書
    positive_keywords: HashSet<&'static str>,
    /// ネガティブキーワード辞書
    negative_keywords: HashSet<&'static str>,
    /// 絵文字感情マップ
    emoji_sentiment_map: HashMap<&'static str, f64>,
    /// 感情強化語
    intensity_modifiers: HashSet<&'static str>,
    /// 否定語
    negation_words: HashSet<&'static str>,
    threshold: f64,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl LexiconClassifier {
    pub fn new(threshold: f64) -> Self {
        Self {
            positive_keywords: Self::positive_lexicon(),
            negative_keywords: Self::negative_lexicon(),
            emoji_sentiment_map: Self::emoji_lexicon(),
            intensity_modifiers: Self::intensity_lexicon(),
            negation_words: Self::negation_lexicon(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn positive_lexicon() -> HashSet<&'static str> {
        [
            "love", "loved", "great", "awesome", "amazing", "excellent", "best", "good",
            "beautiful", "fantastic", "wonderful", "perfect", "thanks", "thank", "enjoyed",
            "enjoy", "helpful", "nice", "cool", "brilliant", "favorite", "favourite",
            "incredible", "legend", "masterpiece", "underrated", "gem", "inspiring", "funny",
            "hilarious", "wholesome", "subscribed", "liked", "epic", "goat", "banger",
            "fire", "insane", "crisp", "quality", "win",
        ]
        .into_iter()
        .collect()
    }

    fn negative_lexicon() -> HashSet<&'static str> {
        [
            "hate", "hated", "bad", "worst", "terrible", "awful", "boring", "disappointing",
            "disappointed", "trash", "garbage", "waste", "annoying", "cringe", "horrible",
            "stupid", "useless", "misleading", "clickbait", "overrated", "scam", "fake",
            "unwatchable", "lame", "dislike", "disliked", "unsubscribed", "ruined", "broken",
            "wrong", "lies", "lying", "pathetic", "meh",
        ]
        .into_iter()
        .collect()
    }

    fn emoji_lexicon() -> HashMap<&'static str, f64> {
        [
            ("😊", 0.8),
            ("😀", 0.9),
            ("😄", 0.9),
            ("😍", 0.9),
            ("🥰", 0.9),
            ("🤗", 0.8),
            ("👍", 0.8),
            ("👏", 0.8),
            ("🎉", 0.9),
            ("🔥", 0.8),
            ("✨", 0.7),
            ("❤️", 0.9),
            ("💖", 0.8),
            ("🏆", 0.9),
            ("😂", 0.8),
            ("🤣", 0.9),
            ("😢", -0.8),
            ("😭", -0.9),
            ("😞", -0.7),
            ("😠", -0.8),
            ("😡", -0.9),
            ("🤬", -1.0),
            ("😤", -0.7),
            ("🤢", -0.8),
            ("👎", -0.8),
            ("💔", -0.9),
            ("🙄", -0.5),
            ("😒", -0.6),
            ("😐", 0.0),
            ("🤔", 0.0),
        ]
        .into_iter()
        .collect()
    }

    fn intensity_lexicon() -> HashSet<&'static str> {
        [
            "very", "really", "so", "super", "extremely", "totally", "absolutely",
            "incredibly", "truly", "insanely",
        ]
        .into_iter()
        .collect()
    }

    fn negation_lexicon() -> HashSet<&'static str> {
        [
            "not", "never", "no", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt",
            "can't", "cant", "won't", "wont", "isn't", "isnt", "wasn't", "wasnt", "aren't",
            "arent", "hardly", "barely",
        ]
        .into_iter()
        .collect()
    }

    /// 合成極性スコアを計算（-1.0〜1.0）。
    pub fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();

        // 1. キーワードベース分析
        let mut score = 0.0;
        for token in &tokens {
            if self.positive_keywords.contains(token) {
                score += KEYWORD_WEIGHT;
            } else if self.negative_keywords.contains(token) {
                score -= KEYWORD_WEIGHT;
            }
        }

        // 2. 絵文字分析
        for (emoji, emoji_score) in &self.emoji_sentiment_map {
            if lowered.contains(emoji) {
                score += emoji_score;
            }
        }

        // 3. 否定語の検出（スコア反転）
        let negated = tokens.iter().any(|t| self.negation_words.contains(t));
        if negated && score != 0.0 {
            score = -score;
        }

        // 4. 感情強化語の適用
        let intensity_hits = tokens
            .iter()
            .filter(|t| self.intensity_modifiers.contains(*t))
            .count();
        if intensity_hits > 0 {
            score *= 1.0 + INTENSITY_STEP * intensity_hits.min(2) as f64;
        }

        score.clamp(-1.0, 1.0)
    }

    fn label_for(&self, score: f64) -> SentimentLabel {
        if score > self.threshold {
            SentimentLabel::Positive
        } else if score < -self.threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl SentimentStrategy for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn classify(&self, texts: &[String]) -> Vec<Option<SentimentLabel>> {
        // Scoring is total over strings; the lexicon strategy never skips.
        texts
            .iter()
            .map(|text| Some(self.label_for(self.score(text))))
            .collect()
    }
}
