// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Fatal configuration and contract errors. Everything else in
// the crate flows through anyhow; these are the cases callers
// need to tell apart (and tests need to downcast to).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("corpus is missing required column '{0}'")]
    MissingColumn(String),

    #[error("corpus is empty: {0}")]
    EmptyCorpus(String),

    #[error("empty batch at step {step} of epoch {epoch}")]
    EmptyBatch { epoch: usize, step: usize },

    #[error("sequence length mismatch: expected {expected}, got {actual}")]
    SequenceLengthMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("non-finite loss {loss} at step {step} of epoch {epoch}")]
    NonFiniteLoss { epoch: usize, step: usize, loss: f64 },
}
