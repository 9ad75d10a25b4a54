// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Reloads a saved parameter directory and runs one prediction:
//   - free text, when given, is tokenised and classified
//   - otherwise a random ragged batch with LoD [0, 4, 10]
//     (two sequences of lengths 4 and 6) is scored

use anyhow::Result;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::DEFAULT_SAVE_DIR;
use crate::domain::review::Sentiment;
use crate::domain::traits::SentimentClassifier;
use crate::infra::checkpoint::ParamStore;
use crate::ml::{
    backend::{dispatch, Place, PlaceTask},
    inferencer::Inferencer,
};

/// Offsets of the random inference batch.
pub const RANDOM_LOD: [usize; 3] = [0, 4, 10];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferConfig {
    pub save_dir: String,
    pub text:     Option<String>,
    /// Seed for the random word ids
    pub seed:     u64,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            save_dir: DEFAULT_SAVE_DIR.to_string(),
            text:     None,
            seed:     90,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InferOutcome {
    /// One probability row per sequence of the random batch
    Probabilities(Vec<Vec<f32>>),
    Label { sentiment: Sentiment, probability: f32 },
}

pub struct InferUseCase {
    config: InferConfig,
}

impl InferUseCase {
    pub fn new(config: InferConfig) -> Self {
        Self { config }
    }

    /// Infer on `place`; `None` when the place is not compiled in.
    pub fn execute(&self, place: Place) -> Result<Option<InferOutcome>> {
        tracing::info!("Inference on {}", place);
        dispatch(place, self)
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<InferOutcome> {
        let store = ParamStore::new(&self.config.save_dir);
        let inferencer = Inferencer::<B>::from_params(&store, device)?;
        tracing::info!("Word dictionary: {} entries", inferencer.word_dict().len());

        let outcome = match &self.config.text {
            Some(text) => {
                let (sentiment, probability) = inferencer.classify(text)?;
                println!("infer results: {} ({:.4})", sentiment, probability);
                InferOutcome::Label { sentiment, probability }
            }
            None => {
                let mut rng = StdRng::seed_from_u64(self.config.seed);
                let batch = inferencer.random_lod_batch(RANDOM_LOD.to_vec(), &mut rng)?;
                let probs = inferencer.infer(&batch)?;
                println!("infer results: {:?}", probs);
                InferOutcome::Probabilities(probs)
            }
        };
        Ok(outcome)
    }
}

impl PlaceTask for &InferUseCase {
    type Output = InferOutcome;

    fn run<B: AutodiffBackend>(self, device: B::Device) -> Result<InferOutcome> {
        self.execute_on::<B::InnerBackend>(&device)
    }
}
