// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Load train + test reviews      (Layer 4 - data)
//   Step 2: Build the word dictionary      (Layer 4 - data)
//   Step 3: Encode both splits             (Layer 4 - data)
//   Step 4: Seed the backend, build model  (Layer 5 - ml)
//   Step 5: Train with the early-stop hook (Layer 5 - ml)
//   Step 6: Make sure parameters are saved (Layer 6 - infra)
//
// The hook is tuned for quick CI runs: it stops after a couple of
// steps, or as soon as test accuracy clears a low bar.

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::SentimentDataset,
    loader::ImdbLoader,
    vocab::{WordDict, DEFAULT_CUTOFF},
};
use crate::domain::traits::{ReviewSource, Split};
use crate::error::{SentimentError, SentimentResult};
use crate::infra::{
    checkpoint::ParamStore,
    metrics::{Metrics, MetricsLogger, Phase},
};
use crate::ml::{
    backend::{dispatch, Place, PlaceTask},
    model::{StackedLstmConfig, BATCH_SIZE, CLASS_DIM, EMB_DIM, HID_DIM, STACKED_NUM},
    trainer::{adagrad, EventHandler, TrainContext, TrainEvent, TrainOptions, Trainer, DEFAULT_LEARNING_RATE},
};

pub const DEFAULT_SAVE_DIR: &str = "understand_sentiment_stacked_lstm.inference.model";
pub const DEFAULT_DATA_DIR: &str = "data/aclImdb";

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub save_dir:        String,
    pub batch_size:      usize,
    pub num_epochs:      usize,
    pub lr:              f64,
    pub emb_dim:         usize,
    pub hid_dim:         usize,
    pub stacked_num:     usize,
    pub class_dim:       usize,
    pub word_cutoff:     usize,
    /// Save and stop once this many steps have run; 0 disables the cap
    pub max_steps:       usize,
    pub target_accuracy: f64,
    pub shuffle_seed:    u64,
    pub seed:            u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        DEFAULT_DATA_DIR.to_string(),
            save_dir:        DEFAULT_SAVE_DIR.to_string(),
            batch_size:      BATCH_SIZE,
            num_epochs:      1,
            lr:              DEFAULT_LEARNING_RATE,
            emb_dim:         EMB_DIM,
            hid_dim:         HID_DIM,
            stacked_num:     STACKED_NUM,
            class_dim:       CLASS_DIM,
            word_cutoff:     DEFAULT_CUTOFF,
            max_steps:       2,
            target_accuracy: 0.2,
            shuffle_seed:    42,
            seed:            90,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self, dict_dim: usize) -> StackedLstmConfig {
        StackedLstmConfig::new(dict_dim)
            .with_class_dim(self.class_dim)
            .with_emb_dim(self.emb_dim)
            .with_hid_dim(self.hid_dim)
            .with_stacked_num(self.stacked_num)
    }
}

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub steps:            usize,
    pub epochs_completed: usize,
    pub stopped_early:    bool,
    pub dict_len:         usize,
    pub last_train:       Option<Metrics>,
    pub last_test:        Option<Metrics>,
}

// ─── Early-stop hook ─────────────────────────────────────────────────────────
pub struct EarlyStopHandler<'a> {
    test_set:        &'a SentimentDataset,
    dict:            &'a WordDict,
    store:           &'a ParamStore,
    logger:          MetricsLogger,
    batch_size:      usize,
    max_steps:       usize,
    target_accuracy: f64,
    saved:           bool,
    last_test:       Option<Metrics>,
}

impl<'a> EarlyStopHandler<'a> {
    pub fn new(
        cfg:      &TrainConfig,
        test_set: &'a SentimentDataset,
        dict:     &'a WordDict,
        store:    &'a ParamStore,
    ) -> Result<Self> {
        Ok(Self {
            test_set,
            dict,
            store,
            logger: MetricsLogger::new(store.dir())?,
            batch_size: cfg.batch_size,
            max_steps: cfg.max_steps,
            target_accuracy: cfg.target_accuracy,
            saved: false,
            last_test: None,
        })
    }

    pub fn saved(&self) -> bool {
        self.saved
    }

    pub fn last_test(&self) -> Option<Metrics> {
        self.last_test
    }

    fn save_and_stop<B: AutodiffBackend>(&mut self, ctx: &mut TrainContext<'_, B>) -> Result<()> {
        ctx.save_params(self.store, self.dict)?;
        self.saved = true;
        ctx.stop();
        Ok(())
    }
}

impl<B: AutodiffBackend> EventHandler<B> for EarlyStopHandler<'_> {
    fn handle(&mut self, event: &TrainEvent, ctx: &mut TrainContext<'_, B>) -> Result<()> {
        match *event {
            TrainEvent::EndStep { epoch, step, metrics } => {
                println!(
                    "Step {}, Epoch {} Metrics [{}, {}]",
                    step, epoch, metrics.avg_cost, metrics.acc
                );
                self.logger.log(Phase::Train, epoch, Some(step), &metrics)?;

                if metrics.is_nan() {
                    return Err(SentimentError::NanLoss.into());
                }
                if self.max_steps > 0 && step + 1 == self.max_steps {
                    tracing::info!("Reached {} steps, saving and stopping", self.max_steps);
                    self.save_and_stop(ctx)?;
                }
            }
            TrainEvent::EndEpoch { epoch } => {
                let m = ctx.test(self.test_set, self.batch_size)?;
                self.last_test = Some(m);
                println!("avg_cost: {}", m.avg_cost);
                println!("acc     : {}", m.acc);
                self.logger.log(Phase::Test, epoch, None, &m)?;

                if judge_epoch(epoch, &m, self.target_accuracy)? == EpochVerdict::SaveAndStop {
                    self.save_and_stop(ctx)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// What to do after the end-of-epoch test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochVerdict {
    SaveAndStop,
    Continue,
}

/// Accuracy above `target_accuracy` wins regardless of cost; otherwise a
/// NaN test cost fails the run.
pub fn judge_epoch(
    epoch:           usize,
    m:               &Metrics,
    target_accuracy: f64,
) -> SentimentResult<EpochVerdict> {
    if m.acc > target_accuracy {
        tracing::info!(
            "Test accuracy {:.4} above {:.4}, saving and stopping",
            m.acc,
            target_accuracy
        );
        return Ok(EpochVerdict::SaveAndStop);
    }

    println!(
        "BatchID {}, Test Loss {:.2}, Acc {:.2}",
        epoch + 1,
        m.avg_cost,
        m.acc
    );
    if m.is_nan() {
        return Err(SentimentError::NanLoss);
    }
    Ok(EpochVerdict::Continue)
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on `place`; `None` when the place is not compiled in.
    pub fn execute(&self, place: Place) -> Result<Option<TrainReport>> {
        tracing::info!("Training on {}", place);
        dispatch(place, self)
    }

    /// Full pipeline against any review source on backend `B`.
    pub fn execute_on<B: AutodiffBackend, S: ReviewSource>(
        &self,
        source: &S,
        device: B::Device,
    ) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load reviews ─────────────────────────────────────────────
        let train_reviews = source.load(Split::Train)?;
        let test_reviews  = source.load(Split::Test)?;

        // ── Step 2: Word dictionary over both splits ─────────────────────────
        let dict = WordDict::build(
            train_reviews.iter().chain(test_reviews.iter()),
            cfg.word_cutoff,
        );
        tracing::info!("Word dictionary: {} entries", dict.len());

        // ── Step 3: Encode ───────────────────────────────────────────────────
        let train_set = SentimentDataset::from_reviews(&train_reviews, &dict);
        let test_set  = SentimentDataset::from_reviews(&test_reviews, &dict);
        tracing::info!(
            "Encoded {} train / {} test reviews",
            train_set.sample_count(),
            test_set.sample_count()
        );

        // ── Step 4: Model and optimiser ──────────────────────────────────────
        B::seed(cfg.seed);
        let model_config = cfg.model_config(dict.len());
        let mut trainer = Trainer::<B, _>::new(model_config, adagrad::<B>(), cfg.lr, device)?;

        // ── Step 5: Train ────────────────────────────────────────────────────
        let store = ParamStore::new(&cfg.save_dir);
        let mut handler = EarlyStopHandler::new(cfg, &test_set, &dict, &store)?;
        let opts = TrainOptions {
            num_epochs:   cfg.num_epochs,
            batch_size:   cfg.batch_size,
            shuffle_seed: cfg.shuffle_seed,
        };
        let summary = trainer.train(&opts, train_set, &mut handler)?;

        // ── Step 6: Always leave parameters behind for inference ─────────────
        if !handler.saved() {
            store.save(trainer.model(), trainer.config(), &dict)?;
        }

        Ok(TrainReport {
            steps:            summary.steps,
            epochs_completed: summary.epochs_completed,
            stopped_early:    summary.stopped_early,
            dict_len:         dict.len(),
            last_train:       summary.last_metrics,
            last_test:        handler.last_test(),
        })
    }
}

impl PlaceTask for &TrainUseCase {
    type Output = TrainReport;

    fn run<B: AutodiffBackend>(self, device: B::Device) -> Result<TrainReport> {
        let source = ImdbLoader::new(&self.config.data_dir);
        self.execute_on::<B, _>(&source, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::fixtures::write_imdb_tree;
    use burn::backend::{
        ndarray::{NdArray, NdArrayDevice},
        Autodiff,
    };
    use std::path::Path;

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config(data: &Path, save: &Path) -> TrainConfig {
        TrainConfig {
            data_dir:    data.display().to_string(),
            save_dir:    save.display().to_string(),
            batch_size:  4,
            emb_dim:     8,
            hid_dim:     16,
            word_cutoff: 0,
            ..TrainConfig::default()
        }
    }

    fn run(cfg: TrainConfig) -> TrainReport {
        let source = ImdbLoader::new(&cfg.data_dir);
        TrainUseCase::new(cfg)
            .execute_on::<TestBackend, _>(&source, NdArrayDevice::Cpu)
            .unwrap()
    }

    #[test]
    fn test_step_cap_saves_and_stops() {
        let tmp = tempfile::tempdir().unwrap();
        write_imdb_tree(&tmp.path().join("aclImdb"));
        let save = tmp.path().join("params");

        let report = run(tiny_config(&tmp.path().join("aclImdb"), &save));
        assert_eq!(report.steps, 2);
        assert!(report.stopped_early);
        assert!(ParamStore::new(&save).exists());

        let csv = std::fs::read_to_string(save.join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_accuracy_target_stops_after_epoch() {
        let tmp = tempfile::tempdir().unwrap();
        write_imdb_tree(&tmp.path().join("aclImdb"));
        let save = tmp.path().join("params");

        let cfg = TrainConfig {
            max_steps:       0,
            num_epochs:      3,
            target_accuracy: -1.0,
            ..tiny_config(&tmp.path().join("aclImdb"), &save)
        };
        let report = run(cfg);

        assert_eq!(report.epochs_completed, 1);
        assert!(report.stopped_early);
        let test = report.last_test.unwrap();
        assert!(test.avg_cost.is_finite());
        assert!((0.0..=1.0).contains(&test.acc));
        assert!(ParamStore::new(&save).exists());
    }

    #[test]
    fn test_saves_even_when_no_stop_condition_fires() {
        let tmp = tempfile::tempdir().unwrap();
        write_imdb_tree(&tmp.path().join("aclImdb"));
        let save = tmp.path().join("params");

        let cfg = TrainConfig {
            max_steps:       0,
            target_accuracy: 2.0,
            ..tiny_config(&tmp.path().join("aclImdb"), &save)
        };
        let report = run(cfg);

        assert!(!report.stopped_early);
        assert_eq!(report.epochs_completed, 1);
        assert!(ParamStore::new(&save).exists());
    }

    #[test]
    fn test_dictionary_covers_both_splits() {
        let tmp = tempfile::tempdir().unwrap();
        write_imdb_tree(&tmp.path().join("aclImdb"));
        let save = tmp.path().join("params");

        let report = run(tiny_config(&tmp.path().join("aclImdb"), &save));
        let dict = ParamStore::new(&save).load_word_dict().unwrap();
        assert_eq!(dict.len(), report.dict_len);
        assert!(dict.get("great").is_some());
        assert!(dict.get("awful").is_some());
    }

    #[test]
    fn test_nan_step_loss_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ParamStore::new(tmp.path());
        let dict = WordDict::from_words(vec!["good".into()]);
        let test_set = SentimentDataset::new(vec![]);
        let cfg = TrainConfig::default();
        let mut handler = EarlyStopHandler::new(&cfg, &test_set, &dict, &store).unwrap();

        let device = NdArrayDevice::Cpu;
        let model_config = StackedLstmConfig::new(dict.len()).with_emb_dim(4).with_hid_dim(8);
        let model = model_config.init::<TestBackend>(&device);
        let mut stopped = false;
        let mut ctx = TrainContext::new(&model, &model_config, &device, &mut stopped);

        let event = TrainEvent::EndStep {
            epoch:   0,
            step:    0,
            metrics: Metrics::new(f64::NAN, 0.5),
        };
        let err = EventHandler::<TestBackend>::handle(&mut handler, &event, &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "got NaN loss, training failed.");
        assert!(!handler.saved());
    }

    #[test]
    fn test_nan_test_cost_below_target_aborts() {
        let m = Metrics::new(f64::NAN, 0.1);
        assert_eq!(judge_epoch(0, &m, 0.2), Err(SentimentError::NanLoss));
        assert_eq!(
            anyhow::Error::from(judge_epoch(0, &m, 0.2).unwrap_err()).to_string(),
            "got NaN loss, training failed."
        );
    }

    #[test]
    fn test_epoch_verdicts() {
        assert_eq!(
            judge_epoch(0, &Metrics::new(0.6, 0.55), 0.2),
            Ok(EpochVerdict::SaveAndStop)
        );
        assert_eq!(
            judge_epoch(1, &Metrics::new(0.7, 0.1), 0.2),
            Ok(EpochVerdict::Continue)
        );
        // accuracy target met, cost is not inspected
        assert_eq!(
            judge_epoch(0, &Metrics::new(f64::NAN, 0.5), 0.2),
            Ok(EpochVerdict::SaveAndStop)
        );
    }

    #[test]
    fn test_missing_corpus_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = tiny_config(&tmp.path().join("nope"), &tmp.path().join("params"));
        let source = ImdbLoader::new(&cfg.data_dir);
        assert!(TrainUseCase::new(cfg)
            .execute_on::<TestBackend, _>(&source, NdArrayDevice::Cpu)
            .is_err());
    }
}
