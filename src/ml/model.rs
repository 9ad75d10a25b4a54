// ============================================================
// Layer 5 — Stacked LSTM Classifier
// ============================================================
// Architecture (stacked_num = 3):
//
//   word ids ─► Embedding ─► fc₁ ─► LSTM₁ (forward)
//                             └──┬──┘
//                          cat[fc₁, LSTM₁] ─► fc₂ ─► LSTM₂ (backward)
//                                               └──┬──┘
//                                      cat[fc₂, LSTM₂] ─► fc₃ ─► LSTM₃ (forward)
//                                                          └──┬──┘
//   max over time of cat[fc₃, LSTM₃] ─► Linear ─► softmax
//
// Why alternate directions?
//   Each LSTM sees the sequence in the opposite order from the one
//   below it, so the top features mix left and right context
//   without paying for a full bidirectional layer at every depth.
//
// Why max pooling instead of the last hidden state?
//   Reviews run to hundreds of words; a single strong phrase
//   ("waste of time") should decide the label wherever it sits.
//
// Reference: Burn Book §3 (Building Blocks)
//            Hochreiter & Schmidhuber (1997) Long Short-Term Memory
//            Zhou et al. (2015) A C-LSTM Neural Network for Text Classification

use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::softmax, ElementConversion},
};

use crate::data::batcher::SentimentBatch;
use crate::error::{SentimentError, SentimentResult};
use crate::ml::lstm::{DynamicLstm, DynamicLstmConfig};

pub const CLASS_DIM:   usize = 2;
pub const EMB_DIM:     usize = 128;
pub const HID_DIM:     usize = 512;
pub const STACKED_NUM: usize = 3;
pub const BATCH_SIZE:  usize = 128;

/// Added to padded positions before max pooling so they never win.
const MASK_PENALTY: f64 = 1e9;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct StackedLstmConfig {
    /// Embedding table height (word dictionary length)
    pub dict_dim:    usize,
    #[config(default = 2)]
    pub class_dim:   usize,
    #[config(default = 128)]
    pub emb_dim:     usize,
    /// Width of every fc layer; each LSTM runs with hid_dim / 4 units
    #[config(default = 512)]
    pub hid_dim:     usize,
    /// Number of fc + LSTM pairs, must be odd
    #[config(default = 3)]
    pub stacked_num: usize,
}

impl StackedLstmConfig {
    pub fn validate(&self) -> SentimentResult<()> {
        if self.stacked_num % 2 == 0 {
            return Err(SentimentError::EvenStackedNum(self.stacked_num));
        }
        if self.hid_dim == 0 || self.hid_dim % 4 != 0 {
            return Err(SentimentError::InvalidHiddenDim(self.hid_dim));
        }
        if self.class_dim < 2 {
            return Err(SentimentError::InvalidClassDim(self.class_dim));
        }
        if self.dict_dim == 0 {
            return Err(SentimentError::EmptyDictionary);
        }
        Ok(())
    }

    pub fn lstm_dim(&self) -> usize {
        self.hid_dim / 4
    }

    /// Width of the [fc, lstm] concatenation fed to the next layer
    fn pair_dim(&self) -> usize {
        self.hid_dim + self.lstm_dim()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> StackedLstmNet<B> {
        let embedding = EmbeddingConfig::new(self.dict_dim, self.emb_dim).init(device);

        let projections: Vec<Linear<B>> = (0..self.stacked_num)
            .map(|i| {
                let d_input = if i == 0 { self.emb_dim } else { self.pair_dim() };
                LinearConfig::new(d_input, self.hid_dim).init(device)
            })
            .collect();

        let lstms: Vec<DynamicLstm<B>> = (0..self.stacked_num)
            .map(|_| DynamicLstmConfig::new(self.lstm_dim()).init(device))
            .collect();

        let classifier = LinearConfig::new(self.pair_dim(), self.class_dim).init(device);

        StackedLstmNet { embedding, projections, lstms, classifier }
    }
}

/// Embedding → (fc → LSTM) × stacked_num → max pool → fc.
///
/// Layer 1 reads the embeddings; every later fc reads the previous
/// fc and LSTM outputs side by side. LSTMs alternate direction:
/// odd layers run forward, even layers backward.
#[derive(Module, Debug)]
pub struct StackedLstmNet<B: Backend> {
    pub embedding:   Embedding<B>,
    pub projections: Vec<Linear<B>>,
    pub lstms:       Vec<DynamicLstm<B>>,
    pub classifier:  Linear<B>,
}

pub struct ClassificationOutput<B: Backend> {
    pub loss:   Tensor<B, 1>,
    pub logits: Tensor<B, 2>,
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> StackedLstmNet<B> {
    /// word_ids, mask: [batch, seq_len] → logits [batch, class_dim]
    pub fn forward(&self, word_ids: Tensor<B, 2, Int>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut features = self.embedding.forward(word_ids);

        for (layer, (fc, lstm)) in self.projections.iter().zip(&self.lstms).enumerate() {
            let projected = fc.forward(features);
            let states = lstm.forward(projected.clone(), mask.clone(), layer % 2 == 1);
            features = Tensor::cat(vec![projected, states], 2);
        }

        // pooling the concatenation == concatenating the pooled fc and lstm
        self.classifier.forward(masked_max_pool(features, mask))
    }

    /// Class probabilities [batch, class_dim]
    pub fn forward_probs(&self, word_ids: Tensor<B, 2, Int>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(word_ids, mask), 1)
    }

    /// Mean cross-entropy over the batch.
    pub fn forward_classification(&self, batch: SentimentBatch<B>) -> ClassificationOutput<B> {
        let logits = self.forward(batch.word_ids, batch.mask);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.labels.clone());

        ClassificationOutput { loss, logits, labels: batch.labels }
    }
}

/// Max over the time axis, ignoring padded steps.
/// x: [batch, seq_len, width], mask: [batch, seq_len] → [batch, width]
pub fn masked_max_pool<B: Backend>(x: Tensor<B, 3>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
    let [batch, _, width] = x.dims();
    let penalty = mask
        .sub_scalar(1.0)
        .mul_scalar(MASK_PENALTY)
        .unsqueeze_dim::<3>(2);
    // reduce over the last axis; ndarray's max_dim backward only scatters there
    (x + penalty)
        .swap_dims(1, 2)
        .max_dim(2)
        .reshape([batch, width])
}

/// Number of rows whose arg-max matches the label.
pub fn correct_count<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    let [batch, _] = logits.dims();
    let predicted = logits.argmax(1).reshape([batch]);
    predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    fn tiny_config() -> StackedLstmConfig {
        StackedLstmConfig::new(20)
            .with_emb_dim(6)
            .with_hid_dim(8)
    }

    #[test]
    fn test_rejects_even_stack() {
        let cfg = tiny_config().with_stacked_num(2);
        assert_eq!(cfg.validate(), Err(SentimentError::EvenStackedNum(2)));
    }

    #[test]
    fn test_rejects_hidden_not_divisible_by_four() {
        let cfg = tiny_config().with_hid_dim(10);
        assert_eq!(cfg.validate(), Err(SentimentError::InvalidHiddenDim(10)));
    }

    #[test]
    fn test_defaults_match_constants() {
        let cfg = StackedLstmConfig::new(100);
        assert_eq!(cfg.class_dim, CLASS_DIM);
        assert_eq!(cfg.emb_dim, EMB_DIM);
        assert_eq!(cfg.hid_dim, HID_DIM);
        assert_eq!(cfg.stacked_num, STACKED_NUM);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_layer_widths() {
        let model = tiny_config().init::<TestBackend>(&NdArrayDevice::Cpu);
        assert_eq!(model.projections.len(), 3);
        assert_eq!(model.lstms.len(), 3);
        assert!(model.lstms.iter().all(|l| l.d_hidden == 2));
    }

    #[test]
    fn test_probabilities_per_sequence() {
        let device = NdArrayDevice::Cpu;
        let model = tiny_config().init::<TestBackend>(&device);

        let ids = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 2, 3, 0, 4, 5, 6, 7], [2, 4]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0], [2, 4]),
            &device,
        );

        let probs = model.forward_probs(ids, mask);
        assert_eq!(probs.dims(), [2, CLASS_DIM]);
        let row_sums: Vec<f32> = probs.sum_dim(1).into_data().to_vec().unwrap();
        for s in row_sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_padding_does_not_change_prediction() {
        let device = NdArrayDevice::Cpu;
        let model = tiny_config().init::<TestBackend>(&device);

        let short = model.forward(
            Tensor::from_data(TensorData::new(vec![3i64, 9, 4], [1, 3]), &device),
            Tensor::ones([1, 3], &device),
        );
        let padded = model.forward(
            Tensor::from_data(TensorData::new(vec![3i64, 9, 4, 0, 0], [1, 5]), &device),
            Tensor::from_data(TensorData::new(vec![1.0f32, 1.0, 1.0, 0.0, 0.0], [1, 5]), &device),
        );

        let a: Vec<f32> = short.into_data().to_vec().unwrap();
        let b: Vec<f32> = padded.into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{x} != {y}");
        }
    }

    #[test]
    fn test_masked_max_pool_skips_padding() {
        let device = NdArrayDevice::Cpu;
        let x = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![-3.0f32, -1.0, -2.0, 5.0, 9.0, 9.0], [1, 3, 2]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, 1.0, 0.0], [1, 3]),
            &device,
        );
        let pooled: Vec<f32> = masked_max_pool(x, mask).into_data().to_vec().unwrap();
        assert_eq!(pooled, vec![-2.0, 5.0]);
    }

    #[test]
    fn test_masked_max_pool_backpropagates() {
        type AutodiffBackend = burn::backend::Autodiff<TestBackend>;
        let device = NdArrayDevice::Cpu;

        let x = Tensor::<AutodiffBackend, 3>::from_data(
            TensorData::new(vec![-3.0f32, -1.0, -2.0, 5.0, 9.0, 9.0], [1, 3, 2]),
            &device,
        )
        .require_grad();
        let mask = Tensor::<AutodiffBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, 1.0, 0.0], [1, 3]),
            &device,
        );

        let grads = masked_max_pool(x.clone(), mask).sum().backward();
        let grad: Vec<f32> = x.grad(&grads).unwrap().into_data().to_vec().unwrap();
        // only the winning live position of each column gets gradient
        assert_eq!(grad, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_correct_count() {
        let device = NdArrayDevice::Cpu;
        let logits = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![0.9f32, 0.1, 0.2, 0.8, 0.7, 0.3], [3, 2]),
            &device,
        );
        let labels = Tensor::<TestBackend, 1, Int>::from_data(
            TensorData::new(vec![0i64, 1, 1], [3]),
            &device,
        );
        assert_eq!(correct_count(logits, labels), 2);
    }
}
