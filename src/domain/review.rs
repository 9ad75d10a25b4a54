// ============================================================
// Layer 3 — Review and Sentiment Domain Types
// ============================================================
// A review is a tokenised movie review with its polarity.
// The class indices follow the IMDB reader convention:
//   positive → 0, negative → 1

use serde::{Deserialize, Serialize};

use crate::error::{SentimentError, SentimentResult};

/// Polarity label of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// Class index used as the training label
    pub fn class_index(self) -> usize {
        match self {
            Sentiment::Positive => 0,
            Sentiment::Negative => 1,
        }
    }

    pub fn from_class_index(index: usize) -> SentimentResult<Self> {
        match index {
            0 => Ok(Sentiment::Positive),
            1 => Ok(Sentiment::Negative),
            other => Err(SentimentError::UnknownClass(other)),
        }
    }

    /// Name of the sub-directory holding reviews of this polarity
    pub fn dir_name(self) -> &'static str {
        match self {
            Sentiment::Positive => "pos",
            Sentiment::Negative => "neg",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// A tokenised review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Lower-cased, punctuation-free words in reading order
    pub tokens: Vec<String>,

    pub label: Sentiment,
}

impl Review {
    pub fn new(tokens: Vec<String>, label: Sentiment) -> Self {
        Self { tokens, label }
    }
}
