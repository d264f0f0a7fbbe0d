// ============================================================
// Layer 4 — Text Standardiser
// ============================================================
// Turns a raw synopsis into the token stream both the
// vocabulary builder and the vectorizer see.
//
// Scraped synopses carry web noise:
//   - Non-breaking spaces (U+00A0) and zero-width spaces
//   - Carriage returns and tabs from copied markup
//   - Quotes, dashes and ellipses around words
//
// Standardisation steps (applied in order):
//   1. Replace Unicode whitespace variants / control chars with space
//   2. Lowercase
//   3. Strip punctuation characters
//   4. Split on whitespace (no stemming)
//
// Both components MUST use the same standardiser, otherwise a
// word counted as "hero" at build time could be looked up as
// "hero," at vectorization time and land on the unknown index.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

#[derive(Debug, Clone, Copy, Default)]
pub struct Standardizer;

impl Standardizer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase, strip punctuation and normalise whitespace.
    pub fn clean(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\t' | '\r' | '\n' => ' ',
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() => ' ',
                c => c,
            })
            .filter(|c| !is_punctuation(*c))
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Standardise and split into tokens. Never yields empty tokens.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// ASCII punctuation plus the typographic marks common in scraped text.
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' // curly quotes
                | '\u{2013}' | '\u{2014}'                     // en / em dash
                | '\u{2026}'                                  // ellipsis
                | '\u{00AB}' | '\u{00BB}'                     // guillemets
                | '\u{00BF}' | '\u{00A1}'
        )
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let s = Standardizer::new();
        assert_eq!(s.tokens("The Hero's Journey, Part II!"), vec!["the", "heros", "journey", "part", "ii"]);
    }

    #[test]
    fn test_normalises_web_whitespace() {
        let s = Standardizer::new();
        assert_eq!(s.tokens("two\u{00A0}words\r\nand\ttabs"), vec!["two", "words", "and", "tabs"]);
    }

    #[test]
    fn test_punctuation_only_tokens_disappear() {
        let s = Standardizer::new();
        assert_eq!(s.tokens("wait \u{2014} what ... ?"), vec!["wait", "what"]);
    }

    #[test]
    fn test_empty_string() {
        let s = Standardizer::new();
        assert!(s.tokens("").is_empty());
    }
}
