// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands `train`, `encode` and `vocab`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{encode_use_case::EncodeConfig, train_use_case::TrainConfig};
use crate::data::vocabulary::VocabularyConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the synopsis autoencoder on a movie CSV
    Train(TrainArgs),

    /// Write the latent vector of every movie to a JSONL file
    Encode(EncodeArgs),

    /// Build the vocabulary and report its size and the genre classes
    Vocab(VocabArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with Synopsis and Genre columns (Title optional)
    #[arg(long, default_value = "data/medium_movies_data.csv")]
    pub corpus: String,

    /// Directory for checkpoints, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Keep only this many most frequent tokens
    #[arg(long, default_value_t = 124_100)]
    pub max_tokens: usize,

    /// Keep every token, ignoring --max-tokens
    #[arg(long)]
    pub unlimited_vocab: bool,

    /// Fixed sequence length; defaults to the longest synopsis
    #[arg(long)]
    pub max_seq_len: Option<usize>,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of movies held out for validation
    #[arg(long, default_value_t = 0.05)]
    pub held_out: f64,

    /// Seeds the split, the shuffle and weight init
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 64)]
    pub embedding_dim: usize,

    /// Hidden size per direction of the first encoder layer
    #[arg(long, default_value_t = 64)]
    pub encoder_hidden: usize,

    /// Hidden size per direction of the second encoder layer;
    /// the latent vector has twice this many values
    #[arg(long, default_value_t = 16)]
    pub latent_hidden: usize,

    #[arg(long, default_value_t = 10)]
    pub decoder_hidden: usize,

    #[arg(long, default_value_t = 20)]
    pub decoder_output_hidden: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Log running loss every N batches
    #[arg(long, default_value_t = 50)]
    pub log_every: usize,

    /// Stop with an error on a NaN or infinite loss
    #[arg(long)]
    pub abort_on_non_finite: bool,

    /// Continue from the latest checkpoint in --checkpoint-dir
    #[arg(long)]
    pub resume: bool,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path:           a.corpus,
            checkpoint_dir:        a.checkpoint_dir,
            max_tokens:            (!a.unlimited_vocab).then_some(a.max_tokens),
            max_seq_len:           a.max_seq_len,
            batch_size:            a.batch_size,
            epochs:                a.epochs,
            lr:                    a.lr,
            held_out_fraction:     a.held_out,
            seed:                  a.seed,
            embedding_dim:         a.embedding_dim,
            encoder_hidden:        a.encoder_hidden,
            latent_hidden:         a.latent_hidden,
            decoder_hidden:        a.decoder_hidden,
            decoder_output_hidden: a.decoder_output_hidden,
            dropout:               a.dropout,
            log_every:             a.log_every,
            abort_on_non_finite:   a.abort_on_non_finite,
            resume:                a.resume,
        }
    }
}

/// All arguments for the `encode` command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[arg(long, default_value = "data/medium_movies_data.csv")]
    pub corpus: String,

    /// Directory where `train` saved its checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// JSONL output, one {index, title, genre, latent} object per line
    #[arg(long, default_value = "features.jsonl")]
    pub output: String,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,
}

impl From<EncodeArgs> for EncodeConfig {
    fn from(a: EncodeArgs) -> Self {
        EncodeConfig {
            corpus_path:    a.corpus,
            checkpoint_dir: a.checkpoint_dir,
            output_path:    a.output,
            batch_size:     a.batch_size,
        }
    }
}

/// All arguments for the `vocab` command
#[derive(Args, Debug)]
pub struct VocabArgs {
    #[arg(long, default_value = "data/medium_movies_data.csv")]
    pub corpus: String,

    #[arg(long, default_value_t = 124_100)]
    pub max_tokens: usize,

    #[arg(long)]
    pub unlimited_vocab: bool,
}

impl VocabArgs {
    pub fn vocabulary_config(&self) -> VocabularyConfig {
        VocabularyConfig { max_tokens: (!self.unlimited_vocab).then_some(self.max_tokens) }
    }
}
