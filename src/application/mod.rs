// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case wires the data, ml and infra layers together
// for one CLI command:
//
//   train  → TrainUseCase   fit the autoencoder, checkpoint per epoch
//   encode → EncodeUseCase  export latent vectors for every movie
//   vocab  → VocabUseCase   report vocabulary size and genre classes
//
// Rules for this layer:
//   - No model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

pub mod train_use_case;

pub mod encode_use_case;

pub mod vocab_use_case;

#[cfg(test)]
pub(crate) mod fixtures;
