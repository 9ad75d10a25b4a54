// ============================================================
// Layer 4 — Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait: a Vec of ragged samples
// becomes one right-padded tensor batch plus a mask.
//
//   lengths [4, 6]  →  word_ids [2, 6]      mask [2, 6]
//                      a a a a 0 0          1 1 1 1 0 0
//                      b b b b b b          1 1 1 1 1 1
//
// The pad id (0) is a real dictionary entry; the mask is what
// keeps padded positions out of the LSTM state and the pooling.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::SentimentSample;
use crate::domain::lod::LodBatch;

const PAD_ID: i64 = 0;

#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// [batch_size, max_len]
    pub word_ids: Tensor<B, 2, Int>,

    /// [batch_size, max_len] — 1.0 real token, 0.0 padding
    pub mask: Tensor<B, 2>,

    /// [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Pad ragged sequences into (word_ids, mask).
    pub fn pad<S: AsRef<[i64]>>(&self, sequences: &[S]) -> (Tensor<B, 2, Int>, Tensor<B, 2>) {
        let batch_size = sequences.len();
        let max_len = sequences
            .iter()
            .map(|s| s.as_ref().len())
            .max()
            .unwrap_or(0)
            .max(1);

        let mut ids  = Vec::with_capacity(batch_size * max_len);
        let mut mask = Vec::with_capacity(batch_size * max_len);
        for seq in sequences {
            let seq = seq.as_ref();
            ids.extend(seq.iter().copied());
            ids.extend(std::iter::repeat(PAD_ID).take(max_len - seq.len()));
            mask.extend(std::iter::repeat(1.0f32).take(seq.len()));
            mask.extend(std::iter::repeat(0.0f32).take(max_len - seq.len()));
        }

        let word_ids = Tensor::<B, 2, Int>::from_data(
            TensorData::new(ids, [batch_size, max_len]),
            &self.device,
        );
        let mask = Tensor::<B, 2>::from_data(
            TensorData::new(mask, [batch_size, max_len]),
            &self.device,
        );
        (word_ids, mask)
    }

    /// Pad an inference LoD batch; labels are not needed there.
    pub fn lod(&self, batch: &LodBatch) -> (Tensor<B, 2, Int>, Tensor<B, 2>) {
        let sequences: Vec<&[i64]> = batch.sequences().collect();
        self.pad(&sequences)
    }
}

impl<B: Backend> Batcher<SentimentSample, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentSample>) -> SentimentBatch<B> {
        let sequences: Vec<&[i64]> = items.iter().map(|s| s.word_ids.as_slice()).collect();
        let (word_ids, mask) = self.pad(&sequences);

        let labels: Vec<i64> = items.iter().map(|s| s.label as i64).collect();
        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [items.len()]),
            &self.device,
        );

        SentimentBatch { word_ids, mask, labels }
    }
}
