// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The corpus is an external collaborator: today a CSV export of
// the scraped movie table, but the application layer only sees
// CorpusSource and never the file format.

use anyhow::Result;
use crate::domain::document::Document;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can supply the ordered (synopsis, genre) rows.
///
/// Implementations:
///   - CsvCorpusLoader → reads a headered CSV with Synopsis/Genre columns
///   - InMemoryCorpus  → a fixed Vec, used by tests
pub trait CorpusSource {
    /// Load every usable row, in file order.
    fn load_all(&self) -> Result<Vec<Document>>;
}

/// A corpus held in memory.
#[cfg(test)]
pub struct InMemoryCorpus {
    docs: Vec<Document>,
}

#[cfg(test)]
impl InMemoryCorpus {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }
}

#[cfg(test)]
impl CorpusSource for InMemoryCorpus {
    fn load_all(&self) -> Result<Vec<Document>> {
        Ok(self.docs.clone())
    }
}
