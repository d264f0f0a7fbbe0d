// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (.mpk file) — one per completed epoch
//   2. latest_epoch.json            — which epoch was last saved
//   3. train_config.json            — TrainConfig incl. model config
//
// The vocabulary lives next to these files (see vocab_store.rs);
// together they are everything `encode` needs to rebuild the
// exact model and turn synopses into latent vectors.
//
// File naming convention:
//   checkpoints/
//     model_epoch_1.mpk
//     model_epoch_2.mpk
//     latest_epoch.json
//     train_config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;

const LATEST_EPOCH_FILE: &str = "latest_epoch.json";
const CONFIG_FILE:       &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<()> {
        // Recorder adds the .mpk extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        Recorder::<B>::record(&CompactRecorder::new(), model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join(LATEST_EPOCH_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {LATEST_EPOCH_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load weights from the latest checkpoint into `model`.
    /// The architecture must match the one that was saved.
    pub fn load_model<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let epoch = self.latest_epoch()?.with_context(|| {
            format!(
                "No checkpoint found in '{}'. Have you run 'train' first?",
                self.dir.display()
            )
        })?;
        self.load_model_at(model, epoch, device)
    }

    pub fn load_model_at<B: Backend, M: Module<B>>(
        &self,
        model:  M,
        epoch:  usize,
        device: &B::Device,
    ) -> Result<M> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));
        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = Recorder::<B>::load(&CompactRecorder::new(), path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'encode'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Epoch of the newest checkpoint, or None before the first save.
    pub fn latest_epoch(&self) -> Result<Option<usize>> {
        let path = self.dir.join(LATEST_EPOCH_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<usize>(&s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::ml::model::{SynopsisAutoencoder, SynopsisAutoencoderConfig};

    type TestBackend = NdArray;

    fn config() -> SynopsisAutoencoderConfig {
        SynopsisAutoencoderConfig::new(6, 3)
            .with_embedding_dim(4)
            .with_encoder_hidden(4)
            .with_latent_hidden(2)
            .with_decoder_hidden(2)
            .with_decoder_output_hidden(3)
    }

    #[test]
    fn test_model_round_trip() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        assert_eq!(ckpt.latest_epoch().unwrap(), None);

        let saved: SynopsisAutoencoder<TestBackend> = config().init(&device);
        ckpt.save_model(&saved, 1).unwrap();
        ckpt.save_model(&saved, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), Some(2));

        let fresh: SynopsisAutoencoder<TestBackend> = config().init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let before: Vec<f32> = saved.embedding.weight.val().into_data().convert::<f32>().to_vec().unwrap();
        let after:  Vec<f32> = loaded.embedding.weight.val().into_data().convert::<f32>().to_vec().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_without_checkpoint_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let model: SynopsisAutoencoder<TestBackend> = config().init(&Default::default());
        assert!(ckpt.load_model(model, &Default::default()).is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg  = TrainConfig { epochs: 3, batch_size: 4, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let back = ckpt.load_config().unwrap();
        assert_eq!(back.epochs, 3);
        assert_eq!(back.batch_size, 4);
    }
}
