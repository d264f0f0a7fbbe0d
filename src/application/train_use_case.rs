// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the movie CSV            (Layer 4 - data)
//   Step 2: Build / reload vocabulary     (Layer 4 + 6)
//   Step 3: Vectorize every synopsis      (Layer 4 - data)
//   Step 4: Seeded train/validation split (Layer 4 - data)
//   Step 5: Build or resume the model     (Layer 5 + 6)
//   Step 6: Save config                   (Layer 6 - infra)
//   Step 7: Run training loop             (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::{prelude::*, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    batcher::DEFAULT_BATCH_SIZE,
    dataset::{vectorize_documents, SynopsisDataset},
    loader::CsvCorpusLoader,
    splitter::{split_train_val, DEFAULT_HELD_OUT_FRACTION},
    vectorizer::Vectorizer,
    vocabulary::{Vocabulary, VocabularyBuilder, VocabularyConfig},
};
use crate::domain::{error::PipelineError, traits::CorpusSource};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    vocab_store::VocabStore,
};
use crate::ml::{
    model::{SynopsisAutoencoder, SynopsisAutoencoderConfig},
    trainer::{train_autoencoder, EpochSink, MetricHistory, StopSignal, TrainingOptions},
};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a training run. Saved as train_config.json so
// `encode` can rebuild the same architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path:           String,
    pub checkpoint_dir:        String,
    /// Regular-token cap for the vocabulary; None keeps every token
    pub max_tokens:            Option<usize>,
    /// Overrides the longest-document length when set
    pub max_seq_len:           Option<usize>,
    pub batch_size:            usize,
    pub epochs:                usize,
    pub lr:                    f64,
    pub held_out_fraction:     f64,
    pub seed:                  u64,
    pub embedding_dim:         usize,
    pub encoder_hidden:        usize,
    pub latent_hidden:         usize,
    pub decoder_hidden:        usize,
    pub decoder_output_hidden: usize,
    pub dropout:               f64,
    pub log_every:             usize,
    pub abort_on_non_finite:   bool,
    pub resume:                bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path:           "data/medium_movies_data.csv".to_string(),
            checkpoint_dir:        "checkpoints".to_string(),
            max_tokens:            VocabularyConfig::default().max_tokens,
            max_seq_len:           None,
            batch_size:            DEFAULT_BATCH_SIZE,
            epochs:                5,
            lr:                    1e-3,
            held_out_fraction:     DEFAULT_HELD_OUT_FRACTION,
            seed:                  42,
            embedding_dim:         64,
            encoder_hidden:        64,
            latent_hidden:         16,
            decoder_hidden:        10,
            decoder_output_hidden: 20,
            dropout:               0.1,
            log_every:             50,
            abort_on_non_finite:   false,
            resume:                false,
        }
    }
}

impl TrainConfig {
    pub fn vocabulary_config(&self) -> VocabularyConfig {
        VocabularyConfig { max_tokens: self.max_tokens }
    }

    pub fn model_config(&self, vocab_size: usize, max_seq_len: usize) -> SynopsisAutoencoderConfig {
        SynopsisAutoencoderConfig::new(vocab_size, max_seq_len)
            .with_embedding_dim(self.embedding_dim)
            .with_encoder_hidden(self.encoder_hidden)
            .with_latent_hidden(self.latent_hidden)
            .with_decoder_hidden(self.decoder_hidden)
            .with_decoder_output_hidden(self.decoder_output_hidden)
            .with_dropout(self.dropout)
    }

    /// True when both configs build models with the same parameter shapes.
    pub fn same_architecture(&self, other: &TrainConfig) -> bool {
        self.embedding_dim == other.embedding_dim
            && self.encoder_hidden == other.encoder_hidden
            && self.latent_hidden == other.latent_hidden
            && self.decoder_hidden == other.decoder_hidden
            && self.decoder_output_hidden == other.decoder_output_hidden
    }

    pub fn training_options(&self, first_epoch: usize) -> TrainingOptions {
        TrainingOptions {
            epochs:              self.epochs,
            first_epoch,
            batch_size:          self.batch_size,
            learning_rate:       self.lr,
            shuffle_seed:        self.seed,
            log_every:           self.log_every,
            abort_on_non_finite: self.abort_on_non_finite,
        }
    }
}

/// What a finished (or stopped) run reports back to the CLI.
#[derive(Debug)]
pub struct TrainReport {
    pub history:         MetricHistory,
    pub stopped:         bool,
    pub vocabulary_size: usize,
    pub max_seq_len:     usize,
}

/// Checkpoints the model and appends metrics after every epoch.
struct CheckpointSink {
    ckpt:            CheckpointManager,
    metrics:         MetricsLogger,
    best_valid_loss: f64,
}

impl<B: Backend> EpochSink<SynopsisAutoencoder<B>> for CheckpointSink {
    fn on_epoch_end(
        &mut self,
        model: &SynopsisAutoencoder<B>,
        train: &EpochMetrics,
        valid: Option<&EpochMetrics>,
    ) -> Result<()> {
        self.ckpt.save_model(model, train.epoch)?;
        self.metrics.log(train, valid)?;
        tracing::info!("Checkpoint saved for epoch {}", train.epoch);

        if let Some(v) = valid.filter(|v| v.is_improvement(self.best_valid_loss)) {
            self.best_valid_loss = v.loss;
            tracing::info!(epoch = v.epoch, val_loss = v.loss, "New best validation loss");
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
    stop:   StopSignal,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, stop: StopSignal::new() }
    }

    /// Handle that stops the run before its next batch.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Run on the default GPU backend.
    pub fn execute(&self) -> Result<TrainReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<TrainBackend>(&device)
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        let docs = CsvCorpusLoader::new(&cfg.corpus_path).load_all()?;

        // ── Step 2: Vocabulary ────────────────────────────────────────────────
        // A resumed run must keep the saved index assignment.
        let store = VocabStore::new(&cfg.checkpoint_dir);
        let (vocab, observed_len) = if cfg.resume && store.exists() {
            store.load()?
        } else {
            let synopses: Vec<&str> = docs.iter().map(|d| d.synopsis.as_str()).collect();
            VocabularyBuilder::new(cfg.vocabulary_config()).build(&synopses)
        };
        let max_seq_len = cfg.max_seq_len.unwrap_or(observed_len);
        if max_seq_len == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_seq_len is 0: no synopsis has any token".to_string(),
            )
            .into());
        }
        store.save(&vocab, max_seq_len)?;

        // ── Step 3: Vectorize ─────────────────────────────────────────────────
        let vocab: Arc<Vocabulary> = Arc::new(vocab);
        let vectorizer = Vectorizer::new(vocab.clone(), max_seq_len);
        let samples = vectorize_documents(&docs, &vectorizer)?;

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, cfg.held_out_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );
        let train_dataset = SynopsisDataset::new(train_samples, max_seq_len)?;
        let val_dataset   = SynopsisDataset::new(val_samples, max_seq_len)?;

        // ── Step 5: Model ─────────────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let model_cfg = cfg.model_config(vocab.len(), max_seq_len);
        model_cfg.validate()?;

        B::seed(device, cfg.seed);
        let mut model: SynopsisAutoencoder<B> = model_cfg.init(device);
        let mut first_epoch = 1;
        if cfg.resume {
            if let Some(latest) = ckpt.latest_epoch()? {
                let saved = ckpt.load_config()?;
                if !saved.same_architecture(cfg) {
                    return Err(PipelineError::InvalidConfig(format!(
                        "cannot resume: layer widths differ from the saved run in '{}'",
                        cfg.checkpoint_dir
                    ))
                    .into());
                }
                model = ckpt.load_model_at(model, latest, device)?;
                first_epoch = latest + 1;
                tracing::info!("Resuming after epoch {}", latest);
            }
        }
        tracing::info!(
            vocab_size  = vocab.len(),
            max_seq_len,
            latent_dim  = model_cfg.latent_dim(),
            "Model ready"
        );

        // ── Step 6: Save config for encode ────────────────────────────────────
        ckpt.save_config(cfg)?;

        // ── Step 7: Training loop ─────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Metrics log: '{}'", metrics.csv_path().display());
        let mut sink = CheckpointSink {
            metrics,
            ckpt,
            best_valid_loss: f64::INFINITY,
        };
        let outcome = train_autoencoder::<B, _>(
            model,
            train_dataset,
            val_dataset,
            &cfg.training_options(first_epoch),
            device,
            &mut sink,
            &self.stop,
        )?;

        Ok(TrainReport {
            history:         outcome.history,
            stopped:         outcome.stopped,
            vocabulary_size: vocab.len(),
            max_seq_len,
        })
    }
}
