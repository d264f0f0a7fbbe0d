// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
//
//   model.rs      — Embedding → 2-layer BiLSTM encoder → latent
//                   vector → 2-layer BiLSTM decoder → per-position
//                   vocabulary logits
//
//   step.rs       — One forward pass with loss, gradients and
//                   token accuracy; the trainer only talks to
//                   models through these traits
//
//   trainer.rs    — Epoch loop: Adam updates, validation pass,
//                   metric history, stop signal, resume offset
//
//   inferencer.rs — Loads a checkpoint and turns synopses into
//                   latent feature vectors
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// BiLSTM autoencoder architecture
pub mod model;

/// Differentiable and evaluation forward steps
pub mod step;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Latent vector extraction from a checkpoint
pub mod inferencer;
