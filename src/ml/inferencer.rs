// ============================================================
// Layer 5 — Latent Extractor
// ============================================================
// Runs only the embedding + encoder half of a trained model to
// turn synopses into latent feature vectors, and optionally the
// full model to see what the decoder makes of a synopsis.
use anyhow::{Context, Result};
use burn::prelude::*;
use std::sync::Arc;

use crate::data::vectorizer::Vectorizer;
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::model::SynopsisAutoencoder;

pub struct LatentExtractor<B: Backend> {
    model:      SynopsisAutoencoder<B>,
    vectorizer: Vectorizer,
    latent_dim: usize,
    device:     B::Device,
}

impl<B: Backend> LatentExtractor<B> {
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        vocab_store:  &VocabStore,
        device:       &B::Device,
    ) -> Result<Self> {
        let cfg = ckpt_manager.load_config()?;
        let (vocab, max_seq_len) = vocab_store.load()?;

        let model_cfg = cfg
            .model_config(vocab.len(), max_seq_len)
            .with_dropout(0.0);
        let model: SynopsisAutoencoder<B> = model_cfg.init(device);
        let model = ckpt_manager.load_model(model, device)?;

        let vectorizer = Vectorizer::new(Arc::new(vocab), max_seq_len);
        tracing::info!(
            vocabulary_size = vectorizer.vocabulary().len(),
            max_seq_len,
            "Model loaded from checkpoint"
        );

        Ok(Self {
            model,
            vectorizer,
            latent_dim: model_cfg.latent_dim(),
            device:     device.clone(),
        })
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    fn input_tensor(&self, documents: &[&str]) -> Tensor<B, 2, Int> {
        let seq_len = self.vectorizer.max_seq_len();
        let flat: Vec<i32> = documents
            .iter()
            .flat_map(|doc| self.vectorizer.vectorize(doc))
            .map(|id| id as i32)
            .collect();
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([documents.len(), seq_len])
    }

    /// One latent vector per document, in input order.
    pub fn latents(&self, documents: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(documents.len());

        for chunk in documents.chunks(batch_size.max(1)) {
            let latent = self.model.encode(self.input_tensor(chunk));
            let values: Vec<f32> = latent
                .into_data()
                .convert::<f32>()
                .to_vec()
                .map_err(|e| anyhow::anyhow!("Cannot read latent tensor: {e:?}"))?;
            out.extend(values.chunks(self.latent_dim).map(<[f32]>::to_vec));
            tracing::debug!("Encoded batch of {}", chunk.len());
        }

        Ok(out)
    }

    /// Decoder's most likely reading of a synopsis, as text.
    pub fn reconstruct_text(&self, document: &str) -> Result<String> {
        let ids: Vec<u32> = self
            .model
            .reconstruct(self.input_tensor(&[document]))
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow::anyhow!("Cannot read reconstruction: {e:?}"))?
            .into_iter()
            .map(|id| u32::try_from(id).context("negative token id"))
            .collect::<Result<_>>()?;
        Ok(self.vectorizer.detokenize(&ids))
    }
}
