// ============================================================
// Layer 2 — EncodeUseCase
// ============================================================
// Turns every movie in the corpus into its latent feature
// vector and writes them as JSON lines, ready for a downstream
// genre classifier:
//
//   {"index":0,"title":"Heat","genre":"crime","latent":[0.12,-0.4,...]}
//
//   Step 1: Load checkpoint, config and vocabulary (Layer 6)
//   Step 2: Load the corpus                        (Layer 4)
//   Step 3: Encode in batches                      (Layer 5)
//   Step 4: Write one record per movie             (Layer 2)

use anyhow::{Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use crate::data::{batcher::DEFAULT_BATCH_SIZE, loader::CsvCorpusLoader};
use crate::domain::{document::Document, traits::CorpusSource};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::inferencer::LatentExtractor;

type InferBackend = burn::backend::Wgpu;

#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub corpus_path:    String,
    pub checkpoint_dir: String,
    pub output_path:    String,
    pub batch_size:     usize,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            corpus_path:    "data/medium_movies_data.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            output_path:    "features.jsonl".to_string(),
            batch_size:     DEFAULT_BATCH_SIZE,
        }
    }
}

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentRecord {
    /// 0-based data row of the movie in the corpus CSV
    pub index:  usize,
    pub title:  Option<String>,
    pub genre:  String,
    pub latent: Vec<f32>,
}

pub struct EncodeUseCase {
    config: EncodeConfig,
}

impl EncodeUseCase {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<usize> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        self.execute_on::<InferBackend>(&device)
    }

    /// Returns the number of records written.
    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<usize> {
        let cfg = &self.config;

        let ckpt      = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let store     = VocabStore::new(&cfg.checkpoint_dir);
        let extractor = LatentExtractor::<B>::from_checkpoint(&ckpt, &store, device)?;

        let docs = CsvCorpusLoader::new(&cfg.corpus_path).load_all()?;
        let synopses: Vec<&str> = docs.iter().map(|d| d.synopsis.as_str()).collect();
        let latents = extractor.latents(&synopses, cfg.batch_size)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Some(first) = synopses.first() {
                let text = extractor.reconstruct_text(first)?;
                tracing::debug!(reconstruction = %text, "Decoder output for the first movie");
            }
        }

        let written = write_jsonl(Path::new(&cfg.output_path), latent_records(docs, latents))?;

        tracing::info!(
            written,
            latent_dim = extractor.latent_dim(),
            "Latent features written to '{}'",
            cfg.output_path
        );
        Ok(written)
    }
}

/// Pairs documents with their latents. Documents without a source
/// row fall back to their position.
fn latent_records(
    docs:    Vec<Document>,
    latents: Vec<Vec<f32>>,
) -> impl Iterator<Item = LatentRecord> {
    docs.into_iter()
        .zip(latents)
        .enumerate()
        .map(|(position, (doc, latent))| LatentRecord {
            index: doc.source_row.unwrap_or(position),
            title: doc.title,
            genre: doc.genre,
            latent,
        })
}

fn write_jsonl(path: &Path, records: impl Iterator<Item = LatentRecord>) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);

    let mut written = 0usize;
    for record in records {
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::application::fixtures::tiny_config;
    use crate::application::train_use_case::TrainUseCase;

    #[test]
    fn test_encode_after_training() {
        let dir = tempfile::tempdir().unwrap();
        let train_cfg = tiny_config(dir.path());
        TrainUseCase::new(train_cfg.clone())
            .execute_on::<Autodiff<NdArray>>(&Default::default())
            .unwrap();

        let output = dir.path().join("out/features.jsonl");
        let encode = EncodeUseCase::new(EncodeConfig {
            corpus_path:    train_cfg.corpus_path.clone(),
            checkpoint_dir: train_cfg.checkpoint_dir.clone(),
            output_path:    output.to_string_lossy().into_owned(),
            batch_size:     4,
        });
        let written = encode.execute_on::<NdArray>(&Default::default()).unwrap();
        assert_eq!(written, 6);

        let text = fs::read_to_string(&output).unwrap();
        let records: Vec<LatentRecord> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 6);
        assert_eq!(records[1].title.as_deref(), Some("Heat"));
        assert_eq!(records[1].genre, "crime");
        for r in &records {
            // latent_hidden = 2 → 4 values
            assert_eq!(r.latent.len(), 4);
            assert!(r.latent.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let train_cfg = tiny_config(dir.path());
        TrainUseCase::new(train_cfg.clone())
            .execute_on::<Autodiff<NdArray>>(&Default::default())
            .unwrap();

        let ckpt  = CheckpointManager::new(&train_cfg.checkpoint_dir).unwrap();
        let store = VocabStore::new(&train_cfg.checkpoint_dir);
        let extractor =
            LatentExtractor::<NdArray>::from_checkpoint(&ckpt, &store, &Default::default()).unwrap();

        let docs = ["A boxer gets one shot.", "A shark hunts a beach town."];
        let one_by_one = extractor.latents(&docs, 1).unwrap();
        let batched    = extractor.latents(&docs, 8).unwrap();
        for (a, b) in one_by_one.iter().zip(&batched) {
            for (x, y) in a.iter().zip(b) {
                assert!((x - y).abs() < 1e-5);
            }
        }

        let text = extractor.reconstruct_text("A boxer gets one shot.").unwrap();
        assert!(text.split_whitespace().count() <= 6);
    }

    #[test]
    fn test_index_is_the_csv_row_after_skips() {
        let docs = crate::data::loader::read_documents(
            "Title,Synopsis,Genre\nA,,drama\nB,Two friends.,comedy\nC,A heist.,crime\n".as_bytes(),
        )
        .unwrap();
        let records: Vec<LatentRecord> =
            latent_records(docs, vec![vec![0.5], vec![-0.5]]).collect();

        let indices: Vec<usize> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(records[0].title.as_deref(), Some("B"));
        assert_eq!(records[1].latent, vec![-0.5]);
    }

    #[test]
    fn test_index_falls_back_to_position() {
        let docs = vec![Document::new("x", "drama"), Document::new("y", "crime")];
        let indices: Vec<usize> = latent_records(docs, vec![vec![], vec![]])
            .map(|r| r.index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_encode_without_training_fails() {
        let dir = tempfile::tempdir().unwrap();
        let encode = EncodeUseCase::new(EncodeConfig {
            checkpoint_dir: dir.path().join("none").to_string_lossy().into_owned(),
            ..EncodeConfig::default()
        });
        assert!(encode.execute_on::<NdArray>(&Default::default()).is_err());
    }
}
