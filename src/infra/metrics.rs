// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training step and per end-of-epoch
// evaluation:
//
//   phase,epoch,step,avg_cost,acc
//   train,0,0,0.693147,0.500000
//   train,0,1,0.690012,0.531250
//   test,0,,0.688100,0.540000

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// Average cost and accuracy over a batch or a whole split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_cost: f64,
    /// Fraction in [0, 1]
    pub acc: f64,
}

impl Metrics {
    pub fn new(avg_cost: f64, acc: f64) -> Self {
        Self { avg_cost, acc }
    }

    pub fn is_nan(&self) -> bool {
        self.avg_cost.is_nan()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Train,
    Test,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Test  => "test",
        }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Creates `dir` and writes the CSV header if the file is new.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "phase,epoch,step,avg_cost,acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// `step` is None for whole-split evaluations.
    pub fn log(&self, phase: Phase, epoch: usize, step: Option<usize>, m: &Metrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let step = step.map(|s| s.to_string()).unwrap_or_default();
        writeln!(
            f,
            "{},{},{},{:.6},{:.6}",
            phase.as_str(),
            epoch,
            step,
            m.avg_cost,
            m.acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
