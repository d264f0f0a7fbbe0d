// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the scraped movie table from a headered CSV file using
// the csv crate.
//
// The table has many columns (Title, Synopsis, Rating, Genre,
// Director, ...). Only two are required:
//   Synopsis → the document text
//   Genre    → the label kept for downstream classification
// Title is picked up when present so exported features can be
// traced back to a movie.
//
// Rows with an empty synopsis (pandas writes NaN as an empty
// field) are skipped with a warning rather than failing the run.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{io::Read, path::PathBuf};

use crate::domain::document::Document;
use crate::domain::error::PipelineError;
use crate::domain::traits::CorpusSource;

pub const SYNOPSIS_COLUMN: &str = "Synopsis";
pub const GENRE_COLUMN:    &str = "Genre";
pub const TITLE_COLUMN:    &str = "Title";

/// Loads (synopsis, genre) rows from a CSV file.
/// Implements the CorpusSource trait from Layer 3.
pub struct CsvCorpusLoader {
    path: PathBuf,
}

impl CsvCorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for CsvCorpusLoader {
    fn load_all(&self) -> Result<Vec<Document>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Cannot open corpus '{}'", self.path.display()))?;
        let docs = read_documents(file)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;
        tracing::info!("Loaded {} documents from '{}'", docs.len(), self.path.display());
        Ok(docs)
    }
}

/// Parse documents from any CSV byte stream.
pub fn read_documents<R: Read>(input: R) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let synopsis_idx = column(SYNOPSIS_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn(SYNOPSIS_COLUMN.to_string()))?;
    let genre_idx = column(GENRE_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn(GENRE_COLUMN.to_string()))?;
    let title_idx = column(TITLE_COLUMN);

    let mut docs    = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV row {}", row + 1))?;

        let synopsis = record.get(synopsis_idx).unwrap_or("").trim();
        if synopsis.is_empty() {
            skipped += 1;
            tracing::warn!(row = row + 1, "Skipping row with empty synopsis");
            continue;
        }

        let genre = record.get(genre_idx).unwrap_or("").trim();
        let mut doc = Document::new(synopsis, genre).with_source_row(row);
        if let Some(title) = title_idx.and_then(|i| record.get(i)) {
            if !title.trim().is_empty() {
                doc = doc.with_title(title.trim());
            }
        }
        docs.push(doc);
    }

    if docs.is_empty() {
        return Err(PipelineError::EmptyCorpus(format!(
            "no rows with a non-empty '{SYNOPSIS_COLUMN}' ({skipped} skipped)"
        ))
        .into());
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} rows without a synopsis", skipped);
    }
    Ok(docs)
}
