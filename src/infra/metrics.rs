// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy loss on training batches
//   - eval_loss:  average cross-entropy loss on the holdout
//                 (NaN when no evaluation ran this epoch)
//   - token_acc:  fraction of non-PAD target tokens predicted
//                 exactly, in [0.0, 1.0]
//
// Output file: {output_dir}/metrics.csv
//
// Example:
//   epoch,train_loss,eval_loss,token_acc
//   1,3.124500,3.089200,0.123000
//   2,2.890100,2.854300,0.184000

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the evaluation holdout.
    /// NaN when evaluation was skipped this epoch.
    pub eval_loss: f64,

    /// Fraction of non-PAD target tokens predicted exactly.
    /// NaN when evaluation was skipped this epoch.
    pub token_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, eval_loss: f64, token_acc: f64) -> Self {
        Self { epoch, train_loss, eval_loss, token_acc }
    }

    /// Returns true if this epoch improved over the previous best eval_loss
    pub fn is_improvement(&self, best_eval_loss: f64) -> bool {
        self.eval_loss < best_eval_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Write the header only if the file is new, so one log can
        // accumulate rows across runs.
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,eval_loss,token_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.eval_loss,
            m.token_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, eval_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.eval_loss,
        );

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
