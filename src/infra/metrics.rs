// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch reconstruction metrics to a CSV file.
//
// Metrics recorded per epoch:
//   - epoch:            the epoch number (1, 2, 3, ...)
//   - train_loss:       mean cross-entropy over training batches
//   - train_acc:        fraction of non-[PAD] tokens reconstructed
//   - val_loss/val_acc: same on the held-out split (empty when
//                       the split is empty)
//   - non_finite_steps: training steps whose loss was NaN/inf
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_acc,val_loss,val_acc,non_finite_steps
//   1,7.812300,0.041000,7.790100,0.039000,0
//   2,6.120400,0.118000,6.301200,0.102000,0
//
// Reading the curves:
//   - train_loss should fall every epoch
//   - val_loss rising while train_loss falls → the autoencoder
//     is memorising synopses instead of compressing them
//   - non_finite_steps > 0 → lower the learning rate
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// Aggregated metrics for one split over one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean loss over batches with a finite loss; NaN if none was finite
    pub loss: f64,

    /// Correct / counted over non-[PAD] positions, in [0.0, 1.0]
    pub token_accuracy: f64,

    /// Number of batches processed
    pub batches: usize,

    /// Steps whose loss was NaN or infinite
    pub non_finite_steps: usize,
}

impl EpochMetrics {
    /// Returns true if this epoch improved over the previous best loss
    pub fn is_improvement(&self, best_loss: f64) -> bool {
        self.loss < best_loss
    }
}

/// Accumulates step results into an EpochMetrics.
#[derive(Debug, Default, Clone)]
pub struct RunningMetric {
    loss_sum:       f64,
    finite_steps:   usize,
    steps:          usize,
    correct:        usize,
    counted:        usize,
    non_finite:     usize,
}

impl RunningMetric {
    pub fn update(&mut self, loss: f64, correct: usize, counted: usize) {
        self.steps   += 1;
        self.correct += correct;
        self.counted += counted;
        if loss.is_finite() {
            self.loss_sum     += loss;
            self.finite_steps += 1;
        } else {
            self.non_finite += 1;
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Mean finite loss so far.
    pub fn mean_loss(&self) -> f64 {
        if self.finite_steps > 0 {
            self.loss_sum / self.finite_steps as f64
        } else {
            f64::NAN
        }
    }

    pub fn finish(&self, epoch: usize) -> EpochMetrics {
        EpochMetrics {
            epoch,
            loss: self.mean_loss(),
            token_accuracy: if self.counted > 0 {
                self.correct as f64 / self.counted as f64
            } else {
                0.0
            },
            batches: self.steps,
            non_finite_steps: self.non_finite,
        }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet, so resumed
    /// runs append to the same log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,train_acc,val_loss,val_acc,non_finite_steps")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch as a new row.
    pub fn log(&self, train: &EpochMetrics, valid: Option<&EpochMetrics>) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        let (val_loss, val_acc) = match valid {
            Some(v) => (format!("{:.6}", v.loss), format!("{:.6}", v.token_accuracy)),
            None    => (String::new(), String::new()),
        };

        writeln!(
            f,
            "{},{:.6},{:.6},{},{},{}",
            train.epoch,
            train.loss,
            train.token_accuracy,
            val_loss,
            val_acc,
            train.non_finite_steps,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}",
            train.epoch,
            train.loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
