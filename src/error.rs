// ============================================================
// Domain Errors
// ============================================================
// Failures the sentiment pipeline can name precisely.
// Everything else (I/O, serialisation, recorder errors) travels
// as anyhow::Error with context attached at the call site.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SentimentError {
    #[error("got NaN loss, training failed.")]
    NanLoss,

    #[error("Invalid LoD offsets {lod:?} for {num_ids} ids: {reason}")]
    InvalidLod {
        lod:     Vec<usize>,
        num_ids: usize,
        reason:  String,
    },

    #[error("Sequence {index} in the batch is empty")]
    EmptySequence { index: usize },

    #[error("stacked_num must be odd, got {0}")]
    EvenStackedNum(usize),

    #[error("hid_dim must be a positive multiple of 4 (4 LSTM gates), got {0}")]
    InvalidHiddenDim(usize),

    #[error("class_dim must be at least 2, got {0}")]
    InvalidClassDim(usize),

    #[error("Word dictionary is empty")]
    EmptyDictionary,

    #[error("Dataset '{0}' contains no reviews")]
    EmptyDataset(String),

    #[error("Token id {id} is outside the dictionary (size {dict_len})")]
    TokenOutOfRange { id: i64, dict_len: usize },

    #[error("Unknown sentiment class index {0}")]
    UnknownClass(usize),
}

pub type SentimentResult<T> = std::result::Result<T, SentimentError>;
