// ============================================================
// Layer 4 — Vectorizer
// ============================================================
// Maps a synopsis to a fixed-length token id sequence:
//
//   "A hero returns."  (max_seq_len = 5, vocab {a:0, hero:1, ...})
//        │ standardise
//        ▼
//   ["a", "hero", "returns"]
//        │ look up (unknown → [UNK])
//        ▼
//   [0, 1, UNK]
//        │ right-pad with [PAD] / truncate at the end
//        ▼
//   [0, 1, UNK, PAD, PAD]
//
// Pure: the same document and vocabulary always give the same
// sequence, and the vocabulary is shared read-only via Arc.

use std::sync::Arc;

use crate::data::preprocessor::Standardizer;
use crate::data::vocabulary::{Vocabulary, UNK_TOKEN};
use crate::domain::error::PipelineError;

#[derive(Debug, Clone)]
pub struct Vectorizer {
    vocab:        Arc<Vocabulary>,
    max_seq_len:  usize,
    standardizer: Standardizer,
}

impl Vectorizer {
    pub fn new(vocab: Arc<Vocabulary>, max_seq_len: usize) -> Self {
        Self { vocab, max_seq_len, standardizer: Standardizer::new() }
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Token ids of exactly `max_seq_len` entries.
    pub fn vectorize(&self, document: &str) -> Vec<u32> {
        let ids = self
            .standardizer
            .tokens(document)
            .iter()
            .take(self.max_seq_len)
            .map(|t| self.vocab.token_to_index(t))
            .collect();
        self.fit_length(ids)
    }

    /// Same as `vectorize`, with the length contract checked.
    pub fn vectorize_checked(&self, document: &str) -> Result<Vec<u32>, PipelineError> {
        let ids = self.vectorize(document);
        if ids.len() != self.max_seq_len {
            return Err(PipelineError::SequenceLengthMismatch {
                expected: self.max_seq_len,
                actual:   ids.len(),
            });
        }
        Ok(ids)
    }

    /// Pad with [PAD] or truncate at the end. Idempotent.
    pub fn fit_length(&self, mut ids: Vec<u32>) -> Vec<u32> {
        ids.truncate(self.max_seq_len);
        ids.resize(self.max_seq_len, self.vocab.pad_index());
        ids
    }

    /// Render ids back to text. Padding is dropped and unknown ids
    /// render as [UNK]; lossy by construction.
    pub fn detokenize(&self, ids: &[u32]) -> String {
        let pad = self.vocab.pad_index();
        ids.iter()
            .filter(|&&id| id != pad)
            .map(|&id| self.vocab.index_to_token(id).unwrap_or(UNK_TOKEN))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocabulary::{VocabularyBuilder, VocabularyConfig};

    fn abc_vectorizer() -> Vectorizer {
        let (vocab, max_len) = VocabularyBuilder::new(VocabularyConfig { max_tokens: None })
            .build(&["a b c", "a"]);
        Vectorizer::new(Arc::new(vocab), max_len)
    }

    #[test]
    fn test_end_to_end_example() {
        let v = abc_vectorizer();
        assert_eq!(v.max_seq_len(), 3);
        assert_eq!(v.vectorize("a b c"), vec![0, 1, 2]);
        assert_eq!(v.vectorize("a"), vec![0, 4, 4]);
        assert_eq!(v.vectorize("z z"), vec![3, 3, 4]);
    }

    #[test]
    fn test_length_is_always_max_seq_len() {
        let v = abc_vectorizer();
        for doc in ["", "a", "a b", "a b c a b c a b c", "!!! ???", "c c c c"] {
            assert_eq!(v.vectorize(doc).len(), 3, "doc = {doc:?}");
        }
    }

    #[test]
    fn test_truncates_at_the_end() {
        let v = abc_vectorizer();
        assert_eq!(v.vectorize("c b a a"), vec![2, 1, 0]);
    }

    #[test]
    fn test_deterministic() {
        let v = abc_vectorizer();
        assert_eq!(v.vectorize("b, A! q"), v.vectorize("b, A! q"));
    }

    #[test]
    fn test_all_unknown_is_valid() {
        let v = abc_vectorizer();
        let unk = v.vocabulary().unknown_index();
        assert_eq!(v.vectorize("x y z"), vec![unk, unk, unk]);
    }

    #[test]
    fn test_fit_length_is_idempotent() {
        let v = abc_vectorizer();
        let once = v.vectorize("a");
        assert_eq!(v.fit_length(once.clone()), once);
        assert_eq!(v.fit_length(vec![0, 1, 2, 0, 1]), vec![0, 1, 2]);
    }

    #[test]
    fn test_detokenize_round_trip_is_stable() {
        let v = abc_vectorizer();
        let first = v.vectorize("A, b!");
        assert_eq!(v.detokenize(&first), "a b");
        assert_eq!(v.vectorize(&v.detokenize(&first)), first);
    }

    #[test]
    fn test_checked_vectorize() {
        let v = abc_vectorizer();
        assert_eq!(v.vectorize_checked("a b").unwrap(), vec![0, 1, 4]);
    }
}
