// ============================================================
// Layer 2 — VocabUseCase
// ============================================================
// Builds the vocabulary over a corpus without training, so the
// model dimensions can be checked before a long run.

use anyhow::Result;

use crate::data::{loader::CsvCorpusLoader, vocabulary::{VocabularyBuilder, VocabularyConfig}};
use crate::domain::{document::genre_classes, traits::CorpusSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabReport {
    pub documents:       usize,
    /// Includes the unknown and padding entries
    pub vocabulary_size: usize,
    pub max_seq_len:     usize,
    pub genres:          Vec<String>,
}

pub struct VocabUseCase<S: CorpusSource> {
    source: S,
    config: VocabularyConfig,
}

impl VocabUseCase<CsvCorpusLoader> {
    pub fn from_csv(path: &str, config: VocabularyConfig) -> Self {
        Self::new(CsvCorpusLoader::new(path), config)
    }
}

impl<S: CorpusSource> VocabUseCase<S> {
    pub fn new(source: S, config: VocabularyConfig) -> Self {
        Self { source, config }
    }

    pub fn execute(&self) -> Result<VocabReport> {
        let docs = self.source.load_all()?;
        let synopses: Vec<&str> = docs.iter().map(|d| d.synopsis.as_str()).collect();
        let (vocab, max_seq_len) = VocabularyBuilder::new(self.config.clone()).build(&synopses);

        let report = VocabReport {
            documents:       docs.len(),
            vocabulary_size: vocab.len(),
            max_seq_len,
            genres:          genre_classes(&docs),
        };
        tracing::info!(
            documents       = report.documents,
            vocabulary_size = report.vocabulary_size,
            max_seq_len,
            genre_classes   = report.genres.len(),
            "Vocabulary built"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fixtures::write_corpus;
    use crate::domain::{document::Document, traits::InMemoryCorpus};

    #[test]
    fn test_report_over_csv() {
        let dir    = tempfile::tempdir().unwrap();
        let path   = write_corpus(dir.path());
        let report = VocabUseCase::from_csv(&path, VocabularyConfig::default())
            .execute()
            .unwrap();

        assert_eq!(report.documents, 6);
        assert_eq!(report.max_seq_len, 6);
        assert_eq!(report.genres, vec!["animation", "crime", "horror", "sci_fi", "sports"]);
    }

    #[test]
    fn test_cap_limits_size() {
        let corpus = InMemoryCorpus::new(vec![
            Document::new("a b c", "Drama"),
            Document::new("a", "drama"),
        ]);
        let report = VocabUseCase::new(corpus, VocabularyConfig { max_tokens: Some(1) })
            .execute()
            .unwrap();

        assert_eq!(report.vocabulary_size, 3);
        assert_eq!(report.max_seq_len, 3);
        assert_eq!(report.genres, vec!["drama"]);
    }
}
