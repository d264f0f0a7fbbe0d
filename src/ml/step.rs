// ============================================================
// Layer 5 — Forward-pass capabilities
// ============================================================
// The training loop never touches the autodiff graph itself.
// It only sees two capabilities:
//
//   DifferentiableForward  (autodiff backend)
//     batch → (loss, gradients, accuracy counts)
//
//   EvaluationForward      (any backend, usually the inner one
//                           returned by model.valid())
//     batch → loss + accuracy counts, no gradients
//
// Anything implementing these can be trained by trainer.rs.

use burn::{
    module::AutodiffModule,
    optim::GradientsParams,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::ReconstructionBatch;
use crate::ml::model::{reconstruction_loss, token_accuracy_counts, SynopsisAutoencoder};

/// Result of one differentiable forward pass.
pub struct ForwardStep {
    pub loss:           f64,
    pub grads:          GradientsParams,
    pub correct_tokens: usize,
    pub counted_tokens: usize,
}

/// Result of one evaluation-only forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalStep {
    pub loss:           f64,
    pub correct_tokens: usize,
    pub counted_tokens: usize,
}

pub trait DifferentiableForward<B: AutodiffBackend>: AutodiffModule<B> {
    fn forward_with_grads(&self, batch: ReconstructionBatch<B>) -> ForwardStep;
}

pub trait EvaluationForward<B: Backend> {
    fn forward_eval(&self, batch: ReconstructionBatch<B>) -> EvalStep;
}

impl<B: AutodiffBackend> DifferentiableForward<B> for SynopsisAutoencoder<B> {
    fn forward_with_grads(&self, batch: ReconstructionBatch<B>) -> ForwardStep {
        let output = self.forward(batch.input_ids).logits;
        let loss   = reconstruction_loss(output.clone(), batch.targets.clone(), self.pad_index);
        let value  = loss.clone().into_scalar().elem::<f64>();

        let (correct_tokens, counted_tokens) =
            token_accuracy_counts(output, batch.targets, self.pad_index);

        let grads = GradientsParams::from_grads(loss.backward(), self);

        ForwardStep { loss: value, grads, correct_tokens, counted_tokens }
    }
}

impl<B: Backend> EvaluationForward<B> for SynopsisAutoencoder<B> {
    fn forward_eval(&self, batch: ReconstructionBatch<B>) -> EvalStep {
        let logits = self.forward(batch.input_ids).logits;
        let loss = reconstruction_loss(logits.clone(), batch.targets.clone(), self.pad_index)
            .into_scalar()
            .elem::<f64>();
        let (correct_tokens, counted_tokens) =
            token_accuracy_counts(logits, batch.targets, self.pad_index);
        EvalStep { loss, correct_tokens, counted_tokens }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::data::dataloader::batcher::Batcher;

    use crate::data::batcher::SynopsisBatcher;
    use crate::data::dataset::SynopsisSample;
    use crate::ml::model::SynopsisAutoencoderConfig;

    type TestBackend = Autodiff<NdArray>;

    fn batch<B: Backend>(device: &B::Device) -> ReconstructionBatch<B> {
        SynopsisBatcher::<B>::new(device.clone()).batch(vec![
            SynopsisSample { doc_index: 0, token_ids: vec![0, 1, 2, 4] },
            SynopsisSample { doc_index: 1, token_ids: vec![1, 3, 4, 4] },
        ], device)
    }

    fn config() -> SynopsisAutoencoderConfig {
        SynopsisAutoencoderConfig::new(5, 4)
            .with_embedding_dim(4)
            .with_encoder_hidden(6)
            .with_latent_hidden(2)
            .with_decoder_hidden(3)
            .with_decoder_output_hidden(5)
    }

    #[test]
    fn test_forward_with_grads_produces_gradients() {
        let device = Default::default();
        let model: SynopsisAutoencoder<TestBackend> = config().init(&device);

        let step = model.forward_with_grads(batch::<TestBackend>(&device));
        assert!(step.loss.is_finite());
        assert_eq!(step.counted_tokens, 5);
        assert!(!step.grads.is_empty());
    }

    #[test]
    fn test_eval_matches_on_inner_backend() {
        let device = Default::default();
        let model: SynopsisAutoencoder<TestBackend> = config()
            .with_dropout(0.0)
            .init(&device);

        let eval = model.valid().forward_eval(batch::<NdArray>(&device));
        assert!(eval.loss.is_finite());
        assert_eq!(eval.counted_tokens, 5);
    }
}
