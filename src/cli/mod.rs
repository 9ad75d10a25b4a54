// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `train` — train on IMDB and save parameters
//   2. `infer` — reload parameters and predict
//   3. `run`   — train + infer on every available place

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InferArgs, RunArgs, TrainArgs};

use crate::application::{
    infer_use_case::{InferOutcome, InferUseCase},
    run_use_case::RunUseCase,
    train_use_case::{TrainConfig, TrainUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "understand-sentiment",
    version = "0.1.0",
    about = "Train a stacked LSTM sentiment classifier on IMDB reviews, then run inference."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Infer(args) => run_infer(args),
            Commands::Run(args)   => run_all(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let place = args.place;
    tracing::info!("Starting training on reviews in: {}", args.data_dir);

    match TrainUseCase::new(args.into()).execute(place)? {
        Some(report) => println!(
            "Training complete after {} steps. Parameters saved.",
            report.steps
        ),
        None => println!("{} not available in this build, nothing trained.", place),
    }
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    let place = args.place;
    if InferUseCase::new(args.into()).execute(place)?.is_none() {
        println!("{} not available in this build, nothing inferred.", place);
    }
    Ok(())
}

fn run_all(args: RunArgs) -> Result<()> {
    let cfg = TrainConfig { data_dir: args.data_dir, ..TrainConfig::default() };

    for run in RunUseCase::new(cfg, args.infer_seed).execute()? {
        let rows = match &run.infer {
            InferOutcome::Probabilities(rows) => rows.len(),
            InferOutcome::Label { .. } => 1,
        };
        println!(
            "{} pass: {} steps, {} predictions",
            run.place, run.train.steps, rows
        );
    }
    Ok(())
}
