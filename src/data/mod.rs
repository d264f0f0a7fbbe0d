// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV export to tensor batches.
//
//   movies.csv
//       │
//       ▼
//   CsvCorpusLoader     → (synopsis, genre) rows
//       │
//       ▼
//   Standardizer        → lowercase, strip punctuation, split
//       │
//       ▼
//   VocabularyBuilder   → token ↔ index map + max length
//       │
//       ▼
//   Vectorizer          → fixed-length token id sequences
//       │
//       ▼
//   split_train_val     → seeded 95/5 shuffle split
//       │
//       ▼
//   SynopsisDataset     → Burn Dataset
//       │
//       ▼
//   SynopsisBatcher     → [batch, max_seq_len] input/target tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the movie table from CSV
pub mod loader;

/// Text standardisation shared by vocabulary and vectorizer
pub mod preprocessor;

/// Builds the token ↔ index vocabulary
pub mod vocabulary;

/// Maps documents to fixed-length token id sequences
pub mod vectorizer;

/// Implements Burn's Dataset trait for vectorized synopses
pub mod dataset;

/// Implements Burn's Batcher trait for reconstruction batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
