// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with `clap` and hands each command
// to its use case in Layer 2. Printing happens only here.
//
//   1. `train`  — fits the autoencoder and checkpoints every epoch;
//                 Ctrl-C stops it before the next batch
//   2. `encode` — exports latent vectors from the latest checkpoint
//   3. `vocab`  — reports vocabulary size, max length, genre classes
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

/// Ctrl-C → stop request
pub mod signals;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EncodeArgs, TrainArgs, VocabArgs};

#[derive(Parser, Debug)]
#[command(
    name = "synopsis-ae",
    version = "0.1.0",
    about = "Compress movie synopses into latent vectors with a BiLSTM autoencoder."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => run_train(args),
            Commands::Encode(args) => run_encode(args),
            Commands::Vocab(args)  => run_vocab(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.corpus);
    let use_case = TrainUseCase::new(args.into());
    let _signals = signals::install_stop_handler(use_case.stop_signal())?;
    let report   = use_case.execute()?;

    println!(
        "Vocabulary: {} entries, sequence length {}",
        report.vocabulary_size, report.max_seq_len
    );
    if let Some(last) = report.history.train.last() {
        println!("Last epoch {}: loss {:.4}", last.epoch, last.loss);
    }
    if report.stopped {
        println!("Training stopped early. Completed epochs are checkpointed.");
    } else {
        println!("Training complete. Checkpoint saved.");
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    use crate::application::encode_use_case::EncodeUseCase;

    let output  = args.output.clone();
    let written = EncodeUseCase::new(args.into()).execute()?;
    println!("Wrote {written} latent vectors to {output}");
    Ok(())
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    use crate::application::vocab_use_case::VocabUseCase;

    let report = VocabUseCase::from_csv(&args.corpus, args.vocabulary_config()).execute()?;
    println!("Documents:        {}", report.documents);
    println!("Vocabulary size:  {}", report.vocabulary_size);
    println!("Max length:       {}", report.max_seq_len);
    println!("Genre classes:    {}", report.genres.len());
    for genre in &report.genres {
        println!("  {genre}");
    }
    Ok(())
}
