//! Pretrained-model classification strategy.
//!
//! The neural scorer itself is a black box consumed through the
//! [`SequenceScorer`] seam: it is expensive to load, so it is constructed
//! once at process start, injected here, and shared read-only for the rest of
//! the process. This module only owns batching, arg-max selection and the
//! fixed index-to-label table.

use std::sync::Arc;

use tracing::warn;

use super::{SentimentLabel, SentimentStrategy};

/// Class count of the sequence classifier.
pub const NUM_CLASSES: usize = 3;

/// Fixed mapping from model output index to label: 0 → Negative,
/// 1 → Neutral, 2 → Positive.
pub const INDEX_LABELS: [SentimentLabel; NUM_CLASSES] = [
    SentimentLabel::Negative,
    SentimentLabel::Neutral,
    SentimentLabel::Positive,
];

/// Default number of texts handed to the scorer per call.
pub const DEFAULT_BATCH_SIZE: usize = 16;

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("Failed to tokenize input: {reason}")]
    Tokenize { reason: String },

    #[error("Scorer backend failed: {reason}")]
    Backend { reason: String },
}

/// A pretrained three-class sequence classifier.
///
/// Implementations return one score vector per input text, in input order.
/// A per-text failure is reported in place so the rest of the batch survives.
pub trait SequenceScorer: Send + Sync {
    fn score_batch(&self, texts: &[String]) -> Vec<Result<[f32; NUM_CLASSES], ScoreError>>;
}

/// [`SentimentStrategy`] backed by a [`SequenceScorer`].
pub struct ModelClassifier {
    scorer: Arc<dyn SequenceScorer>,
    batch_size: usize,
}

impl ModelClassifier {
    pub fn new(scorer: Arc<dyn SequenceScorer>) -> Self {
        Self {
            scorer,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Index of the highest score; ties resolve to the first maximum so the
/// result is deterministic.
fn arg_max(scores: &[f32; NUM_CLASSES]) -> usize {
    let mut best = 0;
    for (index, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = index;
        }
    }
    best
}

impl SentimentStrategy for ModelClassifier {
    fn name(&self) -> &'static str {
        "model"
    }

    fn classify(&self, texts: &[String]) -> Vec<Option<SentimentLabel>> {
        let mut labels = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let results = self.scorer.score_batch(batch);
            debug_assert_eq!(results.len(), batch.len());

            for (text, result) in batch.iter().zip(results) {
                match result {
                    Ok(scores) => labels.push(Some(INDEX_LABELS[arg_max(&scores)])),
                    Err(error) => {
                        warn!(
                            error = %error,
                            text_preview = %text.chars().take(40).collect::<String>(),
                            "skipping comment the scorer could not handle"
                        );
                        labels.push(None);
                    }
                }
            }
        }

        labels
    }
}
