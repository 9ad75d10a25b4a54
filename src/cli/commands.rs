// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `infer` and `run`.
// Defaults match the stock IMDB configuration.

use clap::{Args, Subcommand};

use crate::application::{
    infer_use_case::InferConfig,
    train_use_case::{TrainConfig, DEFAULT_DATA_DIR, DEFAULT_SAVE_DIR},
};
use crate::data::vocab::DEFAULT_CUTOFF;
use crate::ml::{
    backend::Place,
    model::{BATCH_SIZE, CLASS_DIM, EMB_DIM, HID_DIM, STACKED_NUM},
    trainer::DEFAULT_LEARNING_RATE,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the stacked LSTM on an extracted aclImdb directory
    Train(TrainArgs),

    /// Score a random ragged batch (or --text) with saved parameters
    Infer(InferArgs),

    /// Train then infer on CPU, and on GPU when compiled in
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Directory holding {train,test}/{pos,neg}/*.txt
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Where parameters, config, dictionary and metrics.csv are written
    #[arg(long, default_value = DEFAULT_SAVE_DIR)]
    pub save_dir: String,

    #[arg(long, default_value_t = BATCH_SIZE)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1)]
    pub num_epochs: usize,

    /// Adagrad learning rate
    #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
    pub lr: f64,

    #[arg(long, default_value_t = EMB_DIM)]
    pub emb_dim: usize,

    /// Width of each fc layer; LSTM hidden size is a quarter of it
    #[arg(long, default_value_t = HID_DIM)]
    pub hid_dim: usize,

    /// Number of (fc, LSTM) pairs, must be odd
    #[arg(long, default_value_t = STACKED_NUM)]
    pub stacked_num: usize,

    #[arg(long, default_value_t = CLASS_DIM)]
    pub class_dim: usize,

    /// Words must appear more often than this to get their own id
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    pub word_cutoff: usize,

    /// Save and stop after this many steps (0 = no cap)
    #[arg(long, default_value_t = 2)]
    pub max_steps: usize,

    /// Save and stop once test accuracy exceeds this
    #[arg(long, default_value_t = 0.2)]
    pub target_accuracy: f64,

    #[arg(long, default_value_t = 42)]
    pub shuffle_seed: u64,

    /// Backend seed for parameter initialisation
    #[arg(long, default_value_t = 90)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = Place::Cpu)]
    pub place: Place,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:        a.data_dir,
            save_dir:        a.save_dir,
            batch_size:      a.batch_size,
            num_epochs:      a.num_epochs,
            lr:              a.lr,
            emb_dim:         a.emb_dim,
            hid_dim:         a.hid_dim,
            stacked_num:     a.stacked_num,
            class_dim:       a.class_dim,
            word_cutoff:     a.word_cutoff,
            max_steps:       a.max_steps,
            target_accuracy: a.target_accuracy,
            shuffle_seed:    a.shuffle_seed,
            seed:            a.seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InferArgs {
    #[arg(long, default_value = DEFAULT_SAVE_DIR)]
    pub save_dir: String,

    /// Classify this text instead of a random batch
    #[arg(long)]
    pub text: Option<String>,

    /// Seed for the random word ids
    #[arg(long, default_value_t = 90)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = Place::Cpu)]
    pub place: Place,
}

impl From<InferArgs> for InferConfig {
    fn from(a: InferArgs) -> Self {
        InferConfig { save_dir: a.save_dir, text: a.text, seed: a.seed }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding {train,test}/{pos,neg}/*.txt
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Seed for the random inference batch
    #[arg(long, default_value_t = 90)]
    pub infer_seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["understand-sentiment", "train"]).unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.place, Place::Cpu);
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.batch_size, 128);
        assert_eq!(cfg.hid_dim, 512);
        assert_eq!(cfg.stacked_num, 3);
        assert_eq!(cfg.word_cutoff, 150);
        assert_eq!(cfg.save_dir, DEFAULT_SAVE_DIR);
    }

    #[test]
    fn test_infer_flags() {
        let cli = Cli::try_parse_from([
            "understand-sentiment", "infer", "--text", "so good", "--place", "gpu",
        ])
        .unwrap();
        let Commands::Infer(args) = cli.command else {
            panic!("expected infer");
        };
        assert_eq!(args.place, Place::Gpu);
        let cfg: InferConfig = args.into();
        assert_eq!(cfg.text.as_deref(), Some("so good"));
    }
}
