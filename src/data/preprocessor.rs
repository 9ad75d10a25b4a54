// ============================================================
// Layer 4 — Review Preprocessor
// ============================================================
// Turns the raw bytes of one review file into word tokens.
//
// Steps (applied in order):
//   1. Strip trailing \n and \r
//   2. Drop every ASCII punctuation character
//   3. Lower-case ASCII letters (other characters pass through)
//   4. Split on ASCII whitespace
//
// "don't" therefore becomes "dont" and "<br />" becomes "br".
// The same function is used when building the word dictionary,
// when reading training data and when classifying free text,
// so all three agree on what a word is.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Tokenise one review.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim_end_matches(['\n', '\r']);

        let cleaned: String = trimmed
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        cleaned
            .split_ascii_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(
            p.tokenize("Great Movie!! I didn't expect it."),
            vec!["great", "movie", "i", "didnt", "expect", "it"]
        );
    }

    #[test]
    fn test_html_breaks_collapse_to_words() {
        let p = Preprocessor::new();
        assert_eq!(p.tokenize("bad.<br /><br />awful"), vec!["badbr", "br", "awful"]);
    }

    #[test]
    fn test_non_ascii_is_kept_verbatim() {
        let p = Preprocessor::new();
        // only ASCII letters are lower-cased
        assert_eq!(p.tokenize("Écran TOTAL\r\n"), vec!["Écran", "total"]);
    }

    #[test]
    fn test_whitespace_only() {
        let p = Preprocessor::new();
        assert!(p.tokenize(" \t\n").is_empty());
    }
}
