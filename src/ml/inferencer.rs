// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the network from a saved parameter directory and
// returns class probabilities for ragged (LoD) batches.
use anyhow::{anyhow, Result};
use burn::prelude::*;
use rand::Rng;

use crate::data::{batcher::SentimentBatcher, preprocessor::Preprocessor, vocab::WordDict};
use crate::domain::lod::LodBatch;
use crate::domain::review::Sentiment;
use crate::domain::traits::SentimentClassifier;
use crate::error::SentimentError;
use crate::infra::checkpoint::ParamStore;
use crate::ml::model::{StackedLstmConfig, StackedLstmNet};

pub struct Inferencer<B: Backend> {
    model:        StackedLstmNet<B>,
    config:       StackedLstmConfig,
    dict:         WordDict,
    batcher:      SentimentBatcher<B>,
    preprocessor: Preprocessor,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(
        model:  StackedLstmNet<B>,
        config: StackedLstmConfig,
        dict:   WordDict,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            config,
            dict,
            batcher: SentimentBatcher::new(device),
            preprocessor: Preprocessor::new(),
        }
    }

    pub fn from_params(store: &ParamStore, device: &B::Device) -> Result<Self> {
        let config = store.load_config()?;
        config.validate()?;
        let dict = store.load_word_dict()?;
        if dict.len() != config.dict_dim {
            return Err(anyhow!(
                "Word dictionary has {} entries but the model expects {}",
                dict.len(),
                config.dict_dim
            ));
        }

        let model = store.load_model(config.init::<B>(device), device)?;
        tracing::info!("Model loaded from '{}'", store.dir().display());
        Ok(Self::new(model, config, dict, device.clone()))
    }

    pub fn word_dict(&self) -> &WordDict {
        &self.dict
    }

    /// Random ids drawn uniformly from the whole dictionary.
    pub fn random_lod_batch<R: Rng>(&self, lod: Vec<usize>, rng: &mut R) -> Result<LodBatch> {
        let high = self.dict.len() as i64 - 1;
        Ok(LodBatch::random(lod, 0, high, rng)?)
    }

    /// One row of `class_dim` probabilities per sequence.
    pub fn infer(&self, batch: &LodBatch) -> Result<Vec<Vec<f32>>> {
        batch.check_ids(self.dict.len())?;

        let (word_ids, mask) = self.batcher.lod(batch);
        let probs = self.model.forward_probs(word_ids, mask);

        let flat: Vec<f32> = probs
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read probabilities: {e:?}"))?;

        Ok(flat
            .chunks(self.config.class_dim)
            .map(<[f32]>::to_vec)
            .collect())
    }
}

impl<B: Backend> SentimentClassifier for Inferencer<B> {
    fn classify(&self, text: &str) -> Result<(Sentiment, f32)> {
        let tokens = self.preprocessor.tokenize(text);
        if tokens.is_empty() {
            return Err(SentimentError::EmptySequence { index: 0 }.into());
        }

        let batch = LodBatch::from_sequences(&[self.dict.encode(&tokens)])?;
        let probs = self.infer(&batch)?;
        let row = probs
            .first()
            .ok_or_else(|| anyhow!("Model returned no prediction"))?;

        let (best, p) = row
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        tracing::debug!("'{}' → class {} (p={:.4})", text, best, p);
        Ok((Sentiment::from_class_index(best)?, p))
    }
}
