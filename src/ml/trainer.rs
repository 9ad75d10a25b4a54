// ============================================================
// Layer 5 — Event-driven Trainer
// ============================================================
// Runs the optimisation loop and reports progress as events:
//
//   BeginEpoch ─┬─ BeginStep → forward / backward / step → EndStep ─┐
//               └──────────────────── per batch ◄───────────────────┘
//   EndEpoch
//
// The handler sees every event together with a TrainContext that
// can evaluate the current parameters on a held-out dataset, save
// them, or stop the loop after the current event.
//
// Adagrad keeps a running sum of squared gradients per parameter:
//   G = G + g²
//   θ = θ - lr * g / (√G + ε)
//
// Rare words get few, large updates and frequent words many small
// ones, which suits a sparse embedding table.
//
// Reference: Burn Book §5 (Training)
//            Duchi et al. (2011) Adaptive Subgradient Methods

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdaGradConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::data::{
    batcher::{SentimentBatch, SentimentBatcher},
    dataset::SentimentDataset,
    vocab::WordDict,
};
use crate::error::SentimentError;
use crate::infra::checkpoint::ParamStore;
use crate::infra::metrics::Metrics;
use crate::ml::model::{correct_count, StackedLstmConfig, StackedLstmNet};

pub const DEFAULT_LEARNING_RATE: f64 = 0.002;

/// Adagrad as used for the stacked LSTM.
pub fn adagrad<B: AutodiffBackend>() -> impl Optimizer<StackedLstmNet<B>, B> {
    AdaGradConfig::new()
        .with_epsilon(1e-6)
        .init::<B, StackedLstmNet<B>>()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainEvent {
    BeginEpoch { epoch: usize },
    EndEpoch   { epoch: usize },
    BeginStep  { epoch: usize, step: usize },
    EndStep    { epoch: usize, step: usize, metrics: Metrics },
}

/// What a handler may do while training is running.
pub struct TrainContext<'a, B: AutodiffBackend> {
    model:   &'a StackedLstmNet<B>,
    config:  &'a StackedLstmConfig,
    device:  &'a B::Device,
    stopped: &'a mut bool,
}

impl<'a, B: AutodiffBackend> TrainContext<'a, B> {
    pub(crate) fn new(
        model:   &'a StackedLstmNet<B>,
        config:  &'a StackedLstmConfig,
        device:  &'a B::Device,
        stopped: &'a mut bool,
    ) -> Self {
        Self { model, config, device, stopped }
    }

    /// Average cost and accuracy of the current parameters on `dataset`.
    pub fn test(&self, dataset: &SentimentDataset, batch_size: usize) -> Result<Metrics> {
        evaluate(&self.model.valid(), dataset, batch_size, self.device)
    }

    pub fn save_params(&self, store: &ParamStore, dict: &WordDict) -> Result<()> {
        store.save(self.model, self.config, dict)
    }

    /// Ends training once the current event has been handled.
    pub fn stop(&mut self) {
        *self.stopped = true;
    }

}

pub trait EventHandler<B: AutodiffBackend> {
    fn handle(&mut self, event: &TrainEvent, ctx: &mut TrainContext<'_, B>) -> Result<()>;
}

impl<B, F> EventHandler<B> for F
where
    B: AutodiffBackend,
    F: FnMut(&TrainEvent, &mut TrainContext<'_, B>) -> Result<()>,
{
    fn handle(&mut self, event: &TrainEvent, ctx: &mut TrainContext<'_, B>) -> Result<()> {
        self(event, ctx)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub num_epochs:   usize,
    pub batch_size:   usize,
    pub shuffle_seed: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainSummary {
    /// Epochs whose EndEpoch event was emitted
    pub epochs_completed: usize,
    /// Optimizer steps taken over the whole run
    pub steps:            usize,
    pub last_metrics:     Option<Metrics>,
    pub stopped_early:    bool,
}

pub struct Trainer<B: AutodiffBackend, O> {
    model:  StackedLstmNet<B>,
    optim:  O,
    config: StackedLstmConfig,
    lr:     f64,
    device: B::Device,
}

impl<B, O> Trainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<StackedLstmNet<B>, B>,
{
    pub fn new(config: StackedLstmConfig, optim: O, lr: f64, device: B::Device) -> Result<Self> {
        config.validate()?;
        let model = config.init::<B>(&device);
        tracing::info!(
            "Model ready: dict_dim={}, emb_dim={}, hid_dim={}, stacked_num={} ({} parameters)",
            config.dict_dim,
            config.emb_dim,
            config.hid_dim,
            config.stacked_num,
            model.num_params(),
        );
        Ok(Self { model, optim, config, lr, device })
    }

    pub fn model(&self) -> &StackedLstmNet<B> {
        &self.model
    }

    pub fn config(&self) -> &StackedLstmConfig {
        &self.config
    }

    pub fn train<H: EventHandler<B>>(
        &mut self,
        opts:    &TrainOptions,
        dataset: SentimentDataset,
        handler: &mut H,
    ) -> Result<TrainSummary> {
        if dataset.sample_count() == 0 {
            return Err(SentimentError::EmptyDataset("train".into()).into());
        }

        let loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(self.device.clone()))
            .batch_size(opts.batch_size)
            .shuffle(opts.shuffle_seed)
            .num_workers(1)
            .build(dataset);

        let mut stopped = false;
        let mut summary = TrainSummary::default();

        'epochs: for epoch in 0..opts.num_epochs {
            self.emit(handler, TrainEvent::BeginEpoch { epoch }, &mut stopped)?;
            if stopped {
                break;
            }

            for (step, batch) in loader.iter().enumerate() {
                self.emit(handler, TrainEvent::BeginStep { epoch, step }, &mut stopped)?;
                if stopped {
                    break 'epochs;
                }

                let metrics = self.step(batch);
                summary.steps += 1;
                summary.last_metrics = Some(metrics);
                tracing::debug!(
                    "epoch {} step {}: cost={:.4} acc={:.4}",
                    epoch, step, metrics.avg_cost, metrics.acc
                );

                self.emit(handler, TrainEvent::EndStep { epoch, step, metrics }, &mut stopped)?;
                if stopped {
                    break 'epochs;
                }
            }

            self.emit(handler, TrainEvent::EndEpoch { epoch }, &mut stopped)?;
            summary.epochs_completed = epoch + 1;
            if stopped {
                break;
            }
        }

        summary.stopped_early = stopped;
        tracing::info!(
            "Training finished after {} steps ({} epochs completed)",
            summary.steps,
            summary.epochs_completed
        );
        Ok(summary)
    }

    fn emit<H: EventHandler<B>>(
        &self,
        handler: &mut H,
        event:   TrainEvent,
        stopped: &mut bool,
    ) -> Result<()> {
        let mut ctx = TrainContext::new(&self.model, &self.config, &self.device, stopped);
        handler.handle(&event, &mut ctx)
    }

    /// One forward / backward / Adagrad update.
    fn step(&mut self, batch: SentimentBatch<B>) -> Metrics {
        let output = self.model.forward_classification(batch);
        let [batch_size, _] = output.logits.dims();

        let avg_cost = output.loss.clone().into_scalar().elem::<f64>();
        let correct  = correct_count(output.logits.clone(), output.labels.clone());

        let grads = output.loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(self.lr, self.model.clone(), grads);

        Metrics::new(avg_cost, correct as f64 / batch_size as f64)
    }
}

/// Cost and accuracy averaged over every sample of `dataset`.
pub fn evaluate<B: Backend>(
    model:      &StackedLstmNet<B>,
    dataset:    &SentimentDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Result<Metrics> {
    if dataset.sample_count() == 0 {
        return Err(SentimentError::EmptyDataset("test".into()).into());
    }

    let loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset.clone());

    let mut cost_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in loader.iter() {
        let output = model.forward_classification(batch);
        let [n, _] = output.logits.dims();

        cost_sum += output.loss.into_scalar().elem::<f64>() * n as f64;
        correct  += correct_count(output.logits, output.labels);
        total    += n;
    }

    Ok(Metrics::new(cost_sum / total as f64, correct as f64 / total as f64))
}
