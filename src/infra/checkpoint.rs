// ============================================================
// Layer 6 — Parameter Store
// ============================================================
// Saves and restores a trained network as one directory:
//
//   understand_sentiment_stacked_lstm.inference.model/
//     model.mpk.gz         ← all learned parameters
//     model_config.json    ← architecture (dims, stack depth)
//     word_dict.json       ← the vocabulary used in training
//     metrics.csv          ← written by the metrics logger
//
// Parameters go through Burn's named MessagePack + gzip recorder
// at full precision, so a reload reproduces inference outputs
// bit-for-bit. Loading into a different architecture fails.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::vocab::WordDict;
use crate::ml::model::{StackedLstmConfig, StackedLstmNet};

const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "model_config.json";
const DICT_FILE:   &str = "word_dict.json";

type ParamRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Directory holding one saved parameter set.
#[derive(Debug, Clone)]
pub struct ParamStore {
    dir: PathBuf,
}

impl ParamStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True once `save` has written the model config.
    pub fn exists(&self) -> bool {
        self.dir.join(CONFIG_FILE).is_file()
    }

    /// Write parameters, architecture and dictionary.
    pub fn save<B: Backend>(
        &self,
        model:  &StackedLstmNet<B>,
        config: &StackedLstmConfig,
        dict:   &WordDict,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(MODEL_FILE);
        ParamRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save parameters to '{}'", path.display()))?;

        let config_path = self.dir.join(CONFIG_FILE);
        fs::write(&config_path, serde_json::to_string_pretty(config)?)
            .with_context(|| format!("Cannot write config to '{}'", config_path.display()))?;

        dict.save(&self.dir.join(DICT_FILE))?;

        tracing::info!("Saved parameters to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<StackedLstmConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Has the model been trained?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn load_word_dict(&self) -> Result<WordDict> {
        WordDict::load(&self.dir.join(DICT_FILE))
    }

    /// Restore saved parameters into `model`, which must have the
    /// architecture described by `load_config`.
    pub fn load_model<B: Backend>(
        &self,
        model:  StackedLstmNet<B>,
        device: &B::Device,
    ) -> Result<StackedLstmNet<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = ParamRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load parameters from '{}'", path.display()))?;

        tracing::debug!("Loaded parameters from '{}'", path.display());
        Ok(model.load_record(record))
    }
}
