// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// One row of the movie corpus: the free-text synopsis plus the
// genre label it was scraped under. The title is optional;
// older exports of the dataset do not carry it.

use serde::{Deserialize, Serialize};

/// A movie synopsis with its genre label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Movie title, when the corpus has a `Title` column
    pub title: Option<String>,

    /// The raw synopsis text, before standardisation
    pub synopsis: String,

    /// Genre label, kept verbatim (normalised only when counting classes)
    pub genre: String,

    /// 0-based data row in the source file; rows skipped by the
    /// loader still count
    pub source_row: Option<usize>,
}

impl Document {
    /// Create a new Document without a title.
    ///
    /// Example:
    ///   let doc = Document::new("A retired hitman...", "Action");
    pub fn new(synopsis: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            title:      None,
            synopsis:   synopsis.into(),
            genre:      genre.into(),
            source_row: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source_row(mut self, row: usize) -> Self {
        self.source_row = Some(row);
        self
    }
}

/// Distinct genre classes, lowercased and sorted.
pub fn genre_classes(docs: &[Document]) -> Vec<String> {
    let mut classes: Vec<String> = docs
        .iter()
        .map(|d| d.genre.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();
    classes.sort();
    classes.dedup();
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_classes_are_lowercased_and_unique() {
        let docs = vec![
            Document::new("a", "Drama"),
            Document::new("b", "drama"),
            Document::new("c", "Sci_Fi"),
            Document::new("d", " "),
        ];
        assert_eq!(genre_classes(&docs), vec!["drama", "sci_fi"]);
    }

    #[test]
    fn test_with_title() {
        let doc = Document::new("text", "War").with_title("Dunkirk");
        assert_eq!(doc.title.as_deref(), Some("Dunkirk"));
    }
}
