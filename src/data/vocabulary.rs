// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Scans the corpus once and produces:
//   - an ordered token list (token i has index i)
//   - the longest standardised document, in tokens
//
// Index layout for a vocabulary of n regular tokens:
//
//   0 .. n-1   regular tokens, most frequent first
//   n          [UNK] — anything not in the list
//   n + 1      [PAD] — right padding up to max_seq_len
//
// Ties in frequency are broken by first occurrence in the
// corpus, so the same corpus always yields the same indices.
//
// With a cap (max_tokens = Some(C)) only the C most frequent
// tokens are kept; everything else becomes [UNK] when
// vectorized. Without a cap every distinct token is kept,
// which for the full movie table is ~124k entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Standardizer;

/// Number of reserved indices appended after the regular tokens.
pub const RESERVED_SLOTS: usize = 2;

pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_TOKEN: &str = "[PAD]";

/// Settings for the vocabulary builder. Replaces the old
/// process-wide vocab size constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Keep at most this many regular tokens; None keeps all.
    pub max_tokens: Option<usize>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self { max_tokens: Some(124_100) }
    }
}

/// Immutable token ↔ index mapping with reserved [UNK] and [PAD].
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index:  HashMap<String, u32>,
}

impl Vocabulary {
    /// Build from an ordered list of regular tokens. Duplicates keep
    /// their first position.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list  = Vec::new();
        let mut index = HashMap::new();
        for token in tokens {
            let token = token.into();
            if !index.contains_key(&token) {
                index.insert(token.clone(), list.len() as u32);
                list.push(token);
            }
        }
        Self { tokens: list, index }
    }

    /// Total number of indices, reserved slots included.
    pub fn len(&self) -> usize {
        self.tokens.len() + RESERVED_SLOTS
    }

    /// Regular tokens in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn unknown_index(&self) -> u32 {
        self.tokens.len() as u32
    }

    pub fn pad_index(&self) -> u32 {
        self.tokens.len() as u32 + 1
    }

    /// Index of a standardised token, falling back to [UNK].
    pub fn token_to_index(&self, token: &str) -> u32 {
        self.index.get(token).copied().unwrap_or_else(|| self.unknown_index())
    }

    /// Inverse lookup. Reserved indices render as their marker;
    /// out-of-range indices return None.
    pub fn index_to_token(&self, index: u32) -> Option<&str> {
        let i = index as usize;
        if i < self.tokens.len() {
            Some(&self.tokens[i])
        } else if index == self.unknown_index() {
            Some(UNK_TOKEN)
        } else if index == self.pad_index() {
            Some(PAD_TOKEN)
        } else {
            None
        }
    }
}

/// Scans a corpus and produces a Vocabulary plus the max token count.
pub struct VocabularyBuilder {
    config:       VocabularyConfig,
    standardizer: Standardizer,
}

impl VocabularyBuilder {
    pub fn new(config: VocabularyConfig) -> Self {
        Self { config, standardizer: Standardizer::new() }
    }

    /// Build the vocabulary. Returns (vocabulary, longest document in tokens).
    pub fn build<S: AsRef<str>>(&self, corpus: &[S]) -> (Vocabulary, usize) {
        // token → (count, first occurrence)
        let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
        let mut seen    = 0usize;
        let mut max_len = 0usize;

        for doc in corpus {
            let tokens = self.standardizer.tokens(doc.as_ref());
            max_len = max_len.max(tokens.len());
            for token in tokens {
                let entry = freq.entry(token).or_insert((0, seen));
                entry.0 += 1;
                seen += 1;
            }
        }

        let distinct = freq.len();
        let mut ranked: Vec<(String, (usize, usize))> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        if let Some(cap) = self.config.max_tokens {
            ranked.truncate(cap);
        }

        let vocab = Vocabulary::from_tokens(ranked.into_iter().map(|(token, _)| token));

        tracing::info!(
            distinct,
            kept = vocab.tokens().len(),
            vocabulary_size = vocab.len(),
            max_len,
            "Vocabulary built"
        );
        (vocab, max_len)
    }
}
