use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::vocab::WordDict;
use crate::domain::review::Review;

/// One encoded review: word ids plus class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub word_ids: Vec<i64>,
    pub label:    usize,
}

impl SentimentSample {
    pub fn new(word_ids: Vec<i64>, label: usize) -> Self {
        Self { word_ids, label }
    }
}

/// Cheap-to-clone dataset shared between the trainer and the
/// per-epoch evaluation.
#[derive(Debug, Clone)]
pub struct SentimentDataset {
    samples: Arc<Vec<SentimentSample>>,
}

impl SentimentDataset {
    pub fn new(samples: Vec<SentimentSample>) -> Self {
        Self { samples: Arc::new(samples) }
    }

    /// Encode reviews against `dict`. Reviews with no tokens are
    /// dropped because an empty sequence cannot be pooled.
    pub fn from_reviews(reviews: &[Review], dict: &WordDict) -> Self {
        let samples: Vec<SentimentSample> = reviews
            .iter()
            .filter(|r| !r.tokens.is_empty())
            .map(|r| SentimentSample::new(dict.encode(&r.tokens), r.label.class_index()))
            .collect();

        let dropped = reviews.len() - samples.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} empty reviews", dropped);
        }
        Self::new(samples)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<SentimentSample> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
