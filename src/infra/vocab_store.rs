// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the Vocabulary as a HuggingFace WordLevel
// tokenizer.json so the same file can be opened by any
// `tokenizers` consumer, plus vocab_meta.json for max_seq_len.
//
// In tokenizers 0.15 there is no convenient builder for a
// WordLevel model with a fixed id layout, so the JSON is
// written directly and loaded back with Tokenizer::from_file.
// Ids are written exactly as the Vocabulary assigns them:
//   0 .. n-1  regular tokens
//   n         [UNK]
//   n + 1     [PAD]
// and loading checks that layout before rebuilding.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::data::vocabulary::{Vocabulary, PAD_TOKEN, UNK_TOKEN};

const TOKENIZER_FILE: &str = "tokenizer.json";
const META_FILE:      &str = "vocab_meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct VocabMeta {
    max_seq_len:     usize,
    vocabulary_size: usize,
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn exists(&self) -> bool {
        self.dir.join(TOKENIZER_FILE).exists() && self.dir.join(META_FILE).exists()
    }

    pub fn save(&self, vocab: &Vocabulary, max_seq_len: usize) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let mut model_vocab = serde_json::Map::new();
        for (i, token) in vocab.tokens().iter().enumerate() {
            model_vocab.insert(token.clone(), serde_json::json!(i));
        }
        model_vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(vocab.unknown_index()));
        model_vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(vocab.pad_index()));

        let special = |id: u32, content: &str| {
            serde_json::json!({
                "id": id, "content": content, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            })
        };

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                special(vocab.unknown_index(), UNK_TOKEN),
                special(vocab.pad_index(), PAD_TOKEN),
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": false,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "WhitespaceSplit"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": model_vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.dir.join(TOKENIZER_FILE);
        fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write '{}'", tok_path.display()))?;

        let meta = VocabMeta { max_seq_len, vocabulary_size: vocab.len() };
        fs::write(self.dir.join(META_FILE), serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("Cannot write {META_FILE}"))?;

        tracing::info!(
            vocabulary_size = vocab.len(),
            max_seq_len,
            "Vocabulary saved to '{}'",
            tok_path.display()
        );
        Ok(())
    }

    /// Returns (vocabulary, max_seq_len).
    pub fn load(&self) -> Result<(Vocabulary, usize)> {
        let tok_path  = self.dir.join(TOKENIZER_FILE);
        let tokenizer = Tokenizer::from_file(&tok_path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", tok_path.display(), e)
        })?;

        let mut by_id: Vec<(u32, String)> = tokenizer
            .get_vocab(true)
            .into_iter()
            .map(|(token, id)| (id, token))
            .collect();
        by_id.sort();

        for (expected, (id, token)) in by_id.iter().enumerate() {
            if *id as usize != expected {
                bail!("Vocabulary ids are not dense: '{}' has id {} at position {}", token, id, expected);
            }
        }

        let n = by_id.len().checked_sub(2).context("Vocabulary has no reserved tokens")?;
        if by_id[n].1 != UNK_TOKEN || by_id[n + 1].1 != PAD_TOKEN {
            bail!("Vocabulary must end with {UNK_TOKEN} and {PAD_TOKEN}");
        }
        let vocab = Vocabulary::from_tokens(by_id.into_iter().take(n).map(|(_, token)| token));

        let meta_path = self.dir.join(META_FILE);
        let meta: VocabMeta = serde_json::from_str(
            &fs::read_to_string(&meta_path)
                .with_context(|| format!("Cannot read '{}'", meta_path.display()))?,
        )?;
        if meta.vocabulary_size != vocab.len() {
            bail!(
                "{META_FILE} says {} entries but tokenizer has {}",
                meta.vocabulary_size,
                vocab.len()
            );
        }

        tracing::info!("Loaded vocabulary ({} entries) from disk", vocab.len());
        Ok((vocab, meta.max_seq_len))
    }
}
