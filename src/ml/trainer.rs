// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   Idle ──► TrainingEpoch(e) ──► ValidatingEpoch(e) ──┐
//                 ▲                                    │
//                 └──────────── e + 1 ◄────────────────┤
//                                                      ▼
//                                                    Done
//
// ValidatingEpoch is skipped when the held-out split is empty.
//
// Key Burn insights:
//   - Training runs on an AutodiffBackend B
//   - model.valid() returns the model on B::InnerBackend
//     (no graph, dropout disabled)
//   - The validation batcher must also use B::InnerBackend
//
// The loop itself is backend- and model-agnostic: it only
// calls forward_with_grads / forward_eval (see step.rs).
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{AdamConfig, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::data::{
    batcher::{batches_per_epoch, ReconstructionBatch, SynopsisBatcher},
    dataset::SynopsisDataset,
};
use crate::domain::error::PipelineError;
use crate::infra::metrics::{EpochMetrics, RunningMetric};
use crate::ml::step::{DifferentiableForward, EvaluationForward};

/// Loop settings; built from TrainConfig by the application layer.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Last epoch to run (inclusive)
    pub epochs:              usize,
    /// First epoch to run; > 1 when resuming from a checkpoint
    pub first_epoch:         usize,
    pub batch_size:          usize,
    pub learning_rate:       f64,
    pub shuffle_seed:        u64,
    /// Log the running loss every this many steps (0 disables)
    pub log_every:           usize,
    pub abort_on_non_finite: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs:              5,
            first_epoch:         1,
            batch_size:          8,
            learning_rate:       1e-3,
            shuffle_seed:        42,
            log_every:           50,
            abort_on_non_finite: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    TrainingEpoch(usize),
    ValidatingEpoch(usize),
    Done,
}

/// Per-epoch metrics for both splits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHistory {
    pub train: Vec<EpochMetrics>,
    pub valid: Vec<EpochMetrics>,
}

pub struct TrainingOutcome<M> {
    pub model:   M,
    pub history: MetricHistory,
    /// True when a stop request ended the run early
    pub stopped: bool,
}

/// Cooperative cancellation flag, checked before every batch.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Called once per completed epoch, e.g. to checkpoint and log metrics.
pub trait EpochSink<M> {
    fn on_epoch_end(
        &mut self,
        model: &M,
        train: &EpochMetrics,
        valid: Option<&EpochMetrics>,
    ) -> Result<()>;
}

fn transition(state: &mut TrainerState, next: TrainerState) {
    tracing::debug!(from = ?*state, to = ?next, "Trainer state");
    *state = next;
}

fn check_batch<B: Backend>(
    batch:    &ReconstructionBatch<B>,
    expected: usize,
    epoch:    usize,
    step:     usize,
) -> Result<(), PipelineError> {
    let (batch_size, seq_len) = batch.shape();
    if batch_size == 0 {
        return Err(PipelineError::EmptyBatch { epoch, step });
    }
    if seq_len != expected {
        return Err(PipelineError::SequenceLengthMismatch { expected, actual: seq_len });
    }
    Ok(())
}

/// Run the full training loop.
pub fn train_autoencoder<B, M>(
    mut model:     M,
    train_dataset: SynopsisDataset,
    valid_dataset: SynopsisDataset,
    options:       &TrainingOptions,
    device:        &B::Device,
    sink:          &mut dyn EpochSink<M>,
    stop:          &StopSignal,
) -> Result<TrainingOutcome<M>>
where
    B: AutodiffBackend,
    M: DifferentiableForward<B>,
    M::InnerModule: EvaluationForward<B::InnerBackend>,
{
    if options.batch_size == 0 {
        return Err(PipelineError::InvalidConfig("batch_size must be at least 1".into()).into());
    }
    if train_dataset.sample_count() == 0 {
        return Err(PipelineError::EmptyCorpus("training split has no samples".into()).into());
    }
    let seq_len = train_dataset.max_seq_len();
    if valid_dataset.max_seq_len() != seq_len {
        return Err(PipelineError::SequenceLengthMismatch {
            expected: seq_len,
            actual:   valid_dataset.max_seq_len(),
        }
        .into());
    }

    let has_validation = valid_dataset.sample_count() > 0;
    tracing::info!(
        train = train_dataset.sample_count(),
        valid = valid_dataset.sample_count(),
        batches_per_epoch = batches_per_epoch(train_dataset.sample_count(), options.batch_size),
        "Starting training loop"
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init::<B, M>();

    // ── Data loaders: training on B, validation on B::InnerBackend ───────────
    // No worker threads: batches are processed strictly in order.
    let train_loader = DataLoaderBuilder::new(SynopsisBatcher::<B>::new(device.clone()))
        .batch_size(options.batch_size)
        .shuffle(options.shuffle_seed)
        .build(train_dataset);

    let valid_loader = DataLoaderBuilder::new(SynopsisBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(options.batch_size)
        .build(valid_dataset);

    let mut history = MetricHistory::default();
    let mut state   = TrainerState::Idle;

    for epoch in options.first_epoch..=options.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        transition(&mut state, TrainerState::TrainingEpoch(epoch));
        let mut running = RunningMetric::default();

        for (step, batch) in train_loader.iter().enumerate() {
            if stop.is_stop_requested() {
                tracing::warn!(epoch, step, "Stop requested, ending before this batch");
                transition(&mut state, TrainerState::Done);
                return Ok(TrainingOutcome { model, history, stopped: true });
            }
            check_batch(&batch, seq_len, epoch, step)?;

            let out = model.forward_with_grads(batch);
            if !out.loss.is_finite() {
                tracing::warn!(epoch, step, loss = out.loss, "Non-finite training loss");
                if options.abort_on_non_finite {
                    return Err(PipelineError::NonFiniteLoss { epoch, step, loss: out.loss }.into());
                }
            }
            running.update(out.loss, out.correct_tokens, out.counted_tokens);

            model = optim.step(options.learning_rate, model, out.grads);

            if options.log_every > 0 && running.steps() % options.log_every == 0 {
                tracing::info!(epoch, step = running.steps(), loss = running.mean_loss(), "Running training loss");
            }
        }
        let train_metrics = running.finish(epoch);

        // ── Validation phase ──────────────────────────────────────────────────
        let mut valid_metrics = None;
        if has_validation {
            transition(&mut state, TrainerState::ValidatingEpoch(epoch));
            let model_valid = model.valid();
            let mut running = RunningMetric::default();

            for (step, batch) in valid_loader.iter().enumerate() {
                if stop.is_stop_requested() {
                    tracing::warn!(epoch, step, "Stop requested during validation");
                    transition(&mut state, TrainerState::Done);
                    return Ok(TrainingOutcome { model, history, stopped: true });
                }
                check_batch(&batch, seq_len, epoch, step)?;

                let out = model_valid.forward_eval(batch);
                if !out.loss.is_finite() {
                    tracing::warn!(epoch, step, loss = out.loss, "Non-finite validation loss");
                }
                running.update(out.loss, out.correct_tokens, out.counted_tokens);
            }
            valid_metrics = Some(running.finish(epoch));
        }

        match &valid_metrics {
            Some(v) => println!(
                "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
                epoch, options.epochs, train_metrics.loss, train_metrics.token_accuracy * 100.0,
                v.loss, v.token_accuracy * 100.0,
            ),
            None => println!(
                "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}%",
                epoch, options.epochs, train_metrics.loss, train_metrics.token_accuracy * 100.0,
            ),
        }

        tracing::info!(
            epoch,
            batches          = train_metrics.batches,
            non_finite_steps = train_metrics.non_finite_steps,
            "Epoch finished"
        );
        sink.on_epoch_end(&model, &train_metrics, valid_metrics.as_ref())?;

        history.train.push(train_metrics);
        if let Some(v) = valid_metrics {
            history.valid.push(v);
        }
    }

    transition(&mut state, TrainerState::Done);
    tracing::info!("Training complete!");
    Ok(TrainingOutcome { model, history, stopped: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::Param;

    use crate::data::dataset::SynopsisSample;
    use crate::ml::model::{SynopsisAutoencoder, SynopsisAutoencoderConfig};

    type TestBackend = Autodiff<NdArray>;

    const SEQ_LEN: usize = 4;
    const VOCAB:   usize = 6;

    struct NoopSink;

    impl<M> EpochSink<M> for NoopSink {
        fn on_epoch_end(&mut self, _: &M, _: &EpochMetrics, _: Option<&EpochMetrics>) -> Result<()> {
            Ok(())
        }
    }

    fn dataset(n: usize) -> SynopsisDataset {
        let samples = (0..n)
            .map(|i| SynopsisSample {
                doc_index: i,
                token_ids: vec![(i % 4) as u32, ((i + 1) % 4) as u32, 4, 5],
            })
            .collect();
        SynopsisDataset::new(samples, SEQ_LEN).unwrap()
    }

    fn model() -> SynopsisAutoencoder<TestBackend> {
        SynopsisAutoencoderConfig::new(VOCAB, SEQ_LEN)
            .with_embedding_dim(4)
            .with_encoder_hidden(6)
            .with_latent_hidden(2)
            .with_decoder_hidden(3)
            .with_decoder_output_hidden(5)
            .init(&Default::default())
    }

    fn options(epochs: usize) -> TrainingOptions {
        TrainingOptions { epochs, batch_size: 3, log_every: 1, ..Default::default() }
    }

    /// Records the epochs it was called for.
    struct RecordingSink(Vec<(usize, bool)>);

    impl<M> EpochSink<M> for RecordingSink {
        fn on_epoch_end(&mut self, _: &M, t: &EpochMetrics, v: Option<&EpochMetrics>) -> Result<()> {
            self.0.push((t.epoch, v.is_some()));
            Ok(())
        }
    }

    #[test]
    fn test_history_grows_one_per_epoch() {
        let mut sink = RecordingSink(Vec::new());
        let outcome = train_autoencoder::<TestBackend, _>(
            model(), dataset(7), dataset(2), &options(2),
            &Default::default(), &mut sink, &StopSignal::new(),
        )
        .unwrap();

        assert!(!outcome.stopped);
        assert_eq!(outcome.history.train.len(), 2);
        assert_eq!(outcome.history.valid.len(), 2);
        assert_eq!(outcome.history.train[1].epoch, 2);
        // 7 samples, batch size 3 → ceil(7/3) = 3
        assert_eq!(outcome.history.train[0].batches, 3);
        assert_eq!(outcome.history.valid[0].batches, 1);
        assert_eq!(sink.0, vec![(1, true), (2, true)]);
    }

    #[test]
    fn test_empty_validation_split_adds_no_history() {
        let outcome = train_autoencoder::<TestBackend, _>(
            model(), dataset(4), dataset(0), &options(3),
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .unwrap();

        assert_eq!(outcome.history.train.len(), 3);
        assert!(outcome.history.valid.is_empty());
    }

    #[test]
    fn test_empty_training_split_is_fatal() {
        let err = train_autoencoder::<TestBackend, _>(
            model(), dataset(0), dataset(2), &options(1),
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .err()
        .unwrap();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyCorpus(_))
        ));
    }

    #[test]
    fn test_stop_before_first_batch() {
        let stop = StopSignal::new();
        stop.request_stop();

        let mut sink = RecordingSink(Vec::new());
        let outcome = train_autoencoder::<TestBackend, _>(
            model(), dataset(5), dataset(1), &options(4),
            &Default::default(), &mut sink, &stop,
        )
        .unwrap();

        assert!(outcome.stopped);
        assert!(outcome.history.train.is_empty());
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_resume_runs_remaining_epochs() {
        let opts = TrainingOptions { first_epoch: 3, ..options(4) };
        let outcome = train_autoencoder::<TestBackend, _>(
            model(), dataset(3), dataset(0), &opts,
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .unwrap();

        let epochs: Vec<usize> = outcome.history.train.iter().map(|m| m.epoch).collect();
        assert_eq!(epochs, vec![3, 4]);
    }

    #[test]
    fn test_mismatched_validation_length_is_fatal() {
        let valid = SynopsisDataset::new(
            vec![SynopsisSample { doc_index: 0, token_ids: vec![0, 1] }],
            2,
        )
        .unwrap();
        let err = train_autoencoder::<TestBackend, _>(
            model(), dataset(3), valid, &options(1),
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .err()
        .unwrap();

        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::SequenceLengthMismatch { expected: 4, actual: 2 })
        );
    }

    /// Model whose embedding table is all NaN, so every loss is NaN.
    fn nan_model() -> SynopsisAutoencoder<TestBackend> {
        let mut model = model();
        let [vocab, dim] = model.embedding.weight.dims();
        model.embedding.weight =
            Param::from_tensor(Tensor::full([vocab, dim], f32::NAN, &Default::default()));
        model
    }

    #[test]
    fn test_non_finite_loss_is_counted_and_training_continues() {
        let outcome = train_autoencoder::<TestBackend, _>(
            nan_model(), dataset(5), dataset(0), &options(2),
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .unwrap();

        assert_eq!(outcome.history.train.len(), 2);
        for epoch in &outcome.history.train {
            // 5 samples, batch size 3 → 2 batches, all NaN
            assert_eq!(epoch.batches, 2);
            assert_eq!(epoch.non_finite_steps, epoch.batches);
            assert!(epoch.loss.is_nan());
        }
    }

    #[test]
    fn test_non_finite_loss_aborts_when_asked() {
        let opts = TrainingOptions { abort_on_non_finite: true, ..options(2) };
        let mut sink = RecordingSink(Vec::new());
        let err = train_autoencoder::<TestBackend, _>(
            nan_model(), dataset(5), dataset(1), &opts,
            &Default::default(), &mut sink, &StopSignal::new(),
        )
        .err()
        .unwrap();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NonFiniteLoss { epoch: 1, step: 0, .. })
        ));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_training_reduces_loss() {
        let opts = TrainingOptions { learning_rate: 1e-2, ..options(25) };
        let outcome = train_autoencoder::<TestBackend, _>(
            model(), dataset(6), dataset(0), &opts,
            &Default::default(), &mut NoopSink, &StopSignal::new(),
        )
        .unwrap();

        let first = outcome.history.train.first().unwrap().loss;
        let last  = outcome.history.train.last().unwrap().loss;
        assert!(last < first, "loss did not decrease: {first} -> {last}");
    }
}
