// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The application layer only talks to these abstractions.
//
// Implementations:
//   ReviewSource       → ImdbLoader (extracted aclImdb directory)
//   SentimentClassifier → Inferencer (trained stacked LSTM)

use anyhow::Result;

use crate::domain::review::{Review, Sentiment};

/// Which half of a labelled corpus to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test  => "test",
        }
    }
}

/// Anything that can produce labelled reviews for a split.
pub trait ReviewSource {
    fn load(&self, split: Split) -> Result<Vec<Review>>;
}

/// Anything that can label free text with a sentiment.
pub trait SentimentClassifier {
    /// Returns the predicted sentiment and its probability.
    fn classify(&self, text: &str) -> Result<(Sentiment, f32)>;
}
