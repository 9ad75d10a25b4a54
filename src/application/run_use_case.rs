// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// Train then infer once per place: CPU first, then GPU when the
// binary was built with GPU support. Both passes share the same
// save directory, so the GPU pass overwrites the CPU parameters.

use anyhow::{anyhow, Result};

use crate::application::{
    infer_use_case::{InferConfig, InferOutcome, InferUseCase},
    train_use_case::{TrainConfig, TrainReport, TrainUseCase},
};
use crate::ml::backend::Place;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRun {
    pub place: Place,
    pub train: TrainReport,
    pub infer: InferOutcome,
}

pub struct RunUseCase {
    train: TrainConfig,
    seed:  u64,
}

impl RunUseCase {
    pub fn new(train: TrainConfig, seed: u64) -> Self {
        Self { train, seed }
    }

    pub fn execute(&self) -> Result<Vec<PlaceRun>> {
        let mut runs = Vec::new();

        for place in Place::ALL {
            if !place.is_compiled() {
                tracing::info!("{} support not compiled in, skipping", place);
                continue;
            }

            let Some(train) = TrainUseCase::new(self.train.clone()).execute(place)? else {
                continue;
            };

            let infer_cfg = InferConfig {
                save_dir: self.train.save_dir.clone(),
                text:     None,
                seed:     self.seed,
            };
            let infer = InferUseCase::new(infer_cfg)
                .execute(place)?
                .ok_or_else(|| anyhow!("{} became unavailable between train and infer", place))?;

            runs.push(PlaceRun { place, train, infer });
        }

        Ok(runs)
    }
}
