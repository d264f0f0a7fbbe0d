use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::vectorizer::Vectorizer;
use crate::domain::document::Document;
use crate::domain::error::PipelineError;

/// One vectorized synopsis. The autoencoder target is the same
/// sequence, so no separate label tensor is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynopsisSample {
    /// Position of the source row in the corpus
    pub doc_index: usize,
    pub token_ids: Vec<u32>,
}

pub struct SynopsisDataset {
    samples:     Vec<SynopsisSample>,
    max_seq_len: usize,
}

impl SynopsisDataset {
    /// Every sample must already be exactly `max_seq_len` long.
    pub fn new(samples: Vec<SynopsisSample>, max_seq_len: usize) -> Result<Self, PipelineError> {
        if let Some(bad) = samples.iter().find(|s| s.token_ids.len() != max_seq_len) {
            return Err(PipelineError::SequenceLengthMismatch {
                expected: max_seq_len,
                actual:   bad.token_ids.len(),
            });
        }
        Ok(Self { samples, max_seq_len })
    }

    pub fn max_seq_len(&self) -> usize { self.max_seq_len }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SynopsisSample> for SynopsisDataset {
    fn get(&self, index: usize) -> Option<SynopsisSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Vectorize every document, keeping its corpus position.
pub fn vectorize_documents(
    docs:       &[Document],
    vectorizer: &Vectorizer,
) -> Result<Vec<SynopsisSample>, PipelineError> {
    docs.iter()
        .enumerate()
        .map(|(doc_index, doc)| {
            Ok(SynopsisSample {
                doc_index,
                token_ids: vectorizer.vectorize_checked(&doc.synopsis)?,
            })
        })
        .collect()
}
