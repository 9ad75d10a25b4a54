// ============================================================
// Layer 4 — Word Dictionary
// ============================================================
// Maps words to embedding rows.
//
// Construction:
//   1. Count every token over the given reviews
//   2. Keep words seen strictly more than `cutoff` times
//   3. Order by descending count, ties broken alphabetically
//   4. Index from 0, then append <unk> with the last index
//
// The dictionary length is the embedding table height, so the
// exact same dictionary must be used for training and inference.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};

use crate::domain::review::Review;
use crate::error::SentimentError;

pub const UNK_TOKEN: &str = "<unk>";

/// Default minimum frequency (exclusive) for a word to get its own id
pub const DEFAULT_CUTOFF: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDict {
    /// words[i] has id i; the last entry is always <unk>
    words: Vec<String>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl WordDict {
    /// Build a dictionary from one or more review collections.
    pub fn build<'a, I>(reviews: I, cutoff: usize) -> Self
    where
        I: IntoIterator<Item = &'a Review>,
    {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for review in reviews {
            for token in &review.tokens {
                *freq.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut counted: Vec<(&str, usize)> = freq
            .into_iter()
            .filter(|&(_, n)| n > cutoff)
            .collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let words = counted
            .into_iter()
            .map(|(w, _)| w.to_string())
            .collect();

        tracing::debug!("Word dictionary built with cutoff {}", cutoff);
        Self::from_words(words)
    }

    /// Build from an ordered word list; <unk> is appended.
    pub fn from_words(mut words: Vec<String>) -> Self {
        words.retain(|w| w != UNK_TOKEN);
        words.push(UNK_TOKEN.to_string());
        let index = Self::index_of(&words);
        Self { words, index }
    }

    fn index_of(words: &[String]) -> HashMap<String, usize> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect()
    }

    /// Number of ids, <unk> included.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn unk_id(&self) -> usize {
        self.words.len() - 1
    }

    pub fn get(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Id of `word`, or the <unk> id.
    pub fn id(&self, word: &str) -> usize {
        self.get(word).unwrap_or_else(|| self.unk_id())
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<i64> {
        tokens.iter().map(|t| self.id(t.as_ref()) as i64).collect()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write word dictionary to '{}'", path.display()))?;
        tracing::debug!("Saved {} words to '{}'", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read word dictionary from '{}'", path.display()))?;
        let mut dict: WordDict = serde_json::from_str(&json)
            .with_context(|| format!("Malformed word dictionary '{}'", path.display()))?;

        if dict.is_empty() || dict.words.last().map(String::as_str) != Some(UNK_TOKEN) {
            return Err(SentimentError::EmptyDictionary.into());
        }
        dict.index = Self::index_of(&dict.words);
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::Sentiment;

    fn review(text: &str) -> Review {
        Review::new(
            text.split_whitespace().map(str::to_string).collect(),
            Sentiment::Positive,
        )
    }

    #[test]
    fn test_orders_by_frequency_then_word() {
        let reviews = vec![review("b a c a b a d"), review("c b")];
        let dict = WordDict::build(&reviews, 0);
        // a:3 b:3 c:2 d:1
        assert_eq!(dict.word(0), Some("a"));
        assert_eq!(dict.word(1), Some("b"));
        assert_eq!(dict.word(2), Some("c"));
        assert_eq!(dict.word(3), Some("d"));
        assert_eq!(dict.word(4), Some(UNK_TOKEN));
        assert_eq!(dict.len(), 5);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let reviews = vec![review("x x x y y z")];
        let dict = WordDict::build(&reviews, 2);
        assert_eq!(dict.get("x"), Some(0));
        assert_eq!(dict.get("y"), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let dict = WordDict::from_words(vec!["good".into(), "bad".into()]);
        assert_eq!(dict.encode(&["bad", "meh", "good"]), vec![1, 2, 0]);
        assert_eq!(dict.unk_id(), 2);
    }

    #[test]
    fn test_everything_below_cutoff_leaves_only_unk() {
        let dict = WordDict::build(&[review("rare words only")], 150);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.id("rare"), 0);
    }

    #[test]
    fn test_save_and_load_preserve_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("word_dict.json");
        let dict = WordDict::from_words(vec!["good".into(), "bad".into()]);
        dict.save(&path).unwrap();

        let loaded = WordDict::load(&path).unwrap();
        assert_eq!(loaded, dict);
        assert_eq!(loaded.id("bad"), 1);
    }
}
