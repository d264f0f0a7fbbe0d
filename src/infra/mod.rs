// ============================================================
// Layer 6 — Infrastructure
// ============================================================
// Everything a run leaves on disk, all under the checkpoint
// directory:
//
//   model_epoch_{n}.mpk   CompactRecorder model weights
//   latest_epoch.json     last completed epoch
//   train_config.json     hyper-parameters, needed by `encode`
//   tokenizer.json        vocabulary as a WordLevel tokenizer
//   vocab_meta.json       max_seq_len and vocabulary size
//   metrics.csv           one row per epoch
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;
