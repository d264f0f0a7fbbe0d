use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        BiLstm, BiLstmConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
};

use crate::domain::error::PipelineError;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, so do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SynopsisAutoencoderConfig {
    /// Vocabulary size including [UNK] and [PAD]; [PAD] is the last index.
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    #[config(default = 64)]
    pub embedding_dim: usize,
    /// Width of the first encoder layer (per direction)
    #[config(default = 64)]
    pub encoder_hidden: usize,
    /// Width of the second encoder layer; the latent vector is twice this
    #[config(default = 16)]
    pub latent_hidden: usize,
    #[config(default = 10)]
    pub decoder_hidden: usize,
    #[config(default = 20)]
    pub decoder_output_hidden: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl SynopsisAutoencoderConfig {
    /// Encoder widths must shrink and decoder widths must grow.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: String| Err(PipelineError::InvalidConfig(msg));
        if self.vocab_size < 2 {
            return invalid(format!("vocab_size {} leaves no room for [UNK]/[PAD]", self.vocab_size));
        }
        if self.max_seq_len == 0 {
            return invalid("max_seq_len must be at least 1".to_string());
        }
        if self.latent_hidden == 0 || self.latent_hidden >= self.encoder_hidden {
            return invalid(format!(
                "encoder must narrow: encoder_hidden={} latent_hidden={}",
                self.encoder_hidden, self.latent_hidden
            ));
        }
        if self.decoder_hidden == 0 || self.decoder_hidden >= self.decoder_output_hidden {
            return invalid(format!(
                "decoder must widen: decoder_hidden={} decoder_output_hidden={}",
                self.decoder_hidden, self.decoder_output_hidden
            ));
        }
        Ok(())
    }

    /// Size of the latent vector produced per document.
    pub fn latent_dim(&self) -> usize {
        2 * self.latent_hidden
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SynopsisAutoencoder<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);

        let encoder = SequenceEncoder {
            wide:   BiLstmConfig::new(self.embedding_dim, self.encoder_hidden, true).init(device),
            narrow: BiLstmConfig::new(2 * self.encoder_hidden, self.latent_hidden, true).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            latent_hidden: self.latent_hidden,
        };

        let decoder = SequenceDecoder {
            narrow: BiLstmConfig::new(self.latent_dim(), self.decoder_hidden, true).init(device),
            wide:   BiLstmConfig::new(2 * self.decoder_hidden, self.decoder_output_hidden, true)
                .init(device),
            projection: LinearConfig::new(2 * self.decoder_output_hidden, self.vocab_size).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        };

        SynopsisAutoencoder {
            embedding,
            encoder,
            decoder,
            max_seq_len: self.max_seq_len,
            pad_index:   self.vocab_size - 1,
        }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
/// Two bidirectional LSTM layers, wide then narrow. Both return
/// per-position states.
#[derive(Module, Debug)]
pub struct SequenceEncoder<B: Backend> {
    pub wide:          BiLstm<B>,
    pub narrow:        BiLstm<B>,
    pub dropout:       Dropout,
    pub latent_hidden: usize,
}

pub struct EncoderOutput<B: Backend> {
    /// [batch, seq_len, 2 * latent_hidden]
    pub states: Tensor<B, 3>,
    /// [batch, 2 * latent_hidden]
    pub latent: Tensor<B, 2>,
}

impl<B: Backend> SequenceEncoder<B> {
    pub fn forward(&self, embedded: Tensor<B, 3>) -> EncoderOutput<B> {
        let (x, _) = self.wide.forward(embedded, None);
        let x = self.dropout.forward(x);
        let (states, _) = self.narrow.forward(x, None);
        let latent = final_states(states.clone(), self.latent_hidden);
        EncoderOutput { states, latent }
    }
}

/// Last state of each direction of a bidirectional output: the forward
/// half at the last position and the backward half at the first.
/// [batch, seq_len, 2 * hidden] → [batch, 2 * hidden]
fn final_states<B: Backend>(states: Tensor<B, 3>, hidden: usize) -> Tensor<B, 2> {
    let [batch_size, seq_len, _] = states.dims();
    let forward = states
        .clone()
        .slice([0..batch_size, seq_len - 1..seq_len, 0..hidden])
        .reshape([batch_size, hidden]);
    let backward = states
        .slice([0..batch_size, 0..1, hidden..2 * hidden])
        .reshape([batch_size, hidden]);
    Tensor::cat(vec![forward, backward], 1)
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
/// Mirror of the encoder: the latent vector is repeated over every
/// position, widened by two bidirectional layers and projected to
/// vocabulary logits per position.
#[derive(Module, Debug)]
pub struct SequenceDecoder<B: Backend> {
    pub narrow:     BiLstm<B>,
    pub wide:       BiLstm<B>,
    pub projection: Linear<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> SequenceDecoder<B> {
    /// latent: [batch, latent_dim] → logits: [batch, seq_len, vocab_size]
    pub fn forward(&self, latent: Tensor<B, 2>, seq_len: usize) -> Tensor<B, 3> {
        let [batch_size, latent_dim] = latent.dims();
        let repeated = latent
            .unsqueeze_dim::<3>(1)
            .expand([batch_size, seq_len, latent_dim]);

        let (x, _) = self.narrow.forward(repeated, None);
        let x = self.dropout.forward(x);
        let (x, _) = self.wide.forward(x, None);
        self.projection.forward(x)
    }
}

// ─── Full model ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct SynopsisAutoencoder<B: Backend> {
    pub embedding:   Embedding<B>,
    pub encoder:     SequenceEncoder<B>,
    pub decoder:     SequenceDecoder<B>,
    pub max_seq_len: usize,
    pub pad_index:   usize,
}

pub struct AutoencoderOutput<B: Backend> {
    /// [batch, latent_dim]
    pub latent: Tensor<B, 2>,
    /// [batch, seq_len, vocab_size], unnormalised
    pub logits: Tensor<B, 3>,
}

impl<B: Backend> SynopsisAutoencoder<B> {
    /// input_ids: [batch, seq_len] → latent: [batch, latent_dim]
    pub fn encode(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded = self.embedding.forward(input_ids);
        self.encoder.forward(embedded).latent
    }

    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> AutoencoderOutput<B> {
        let [_, seq_len] = input_ids.dims();
        let latent = self.encode(input_ids);
        let logits = self.decoder.forward(latent.clone(), seq_len);
        AutoencoderOutput { latent, logits }
    }

    /// Per-position probability distribution over the vocabulary.
    pub fn probabilities(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        softmax(self.forward(input_ids).logits, 2)
    }

    /// Most likely token id per position: [batch, seq_len].
    pub fn reconstruct(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2, Int> {
        let [batch_size, seq_len] = input_ids.dims();
        self.probabilities(input_ids)
            .argmax(2)
            .reshape([batch_size, seq_len])
    }
}

/// Cross-entropy of per-position logits against token-id targets;
/// [PAD] targets contribute nothing.
pub fn reconstruction_loss<B: Backend>(
    logits:    Tensor<B, 3>,
    targets:   Tensor<B, 2, Int>,
    pad_index: usize,
) -> Tensor<B, 1> {
    let [batch_size, seq_len, vocab_size] = logits.dims();
    let ce = CrossEntropyLossConfig::new()
        .with_pad_tokens(Some(vec![pad_index]))
        .init(&logits.device());
    ce.forward(
        logits.reshape([batch_size * seq_len, vocab_size]),
        targets.reshape([batch_size * seq_len]),
    )
}

/// (correctly reconstructed, counted) over non-[PAD] target positions.
pub fn token_accuracy_counts<B: Backend>(
    logits:    Tensor<B, 3>,
    targets:   Tensor<B, 2, Int>,
    pad_index: usize,
) -> (usize, usize) {
    let [batch_size, seq_len, _] = logits.dims();
    let predicted = logits.argmax(2).reshape([batch_size, seq_len]);

    let counted_mask = targets.clone().not_equal_elem(pad_index as i32).int();
    let correct = predicted.equal(targets).int() * counted_mask.clone();

    let correct: i64 = correct.sum().into_scalar().elem::<i64>();
    let counted: i64 = counted_mask.sum().into_scalar().elem::<i64>();
    (correct as usize, counted as usize)
}
