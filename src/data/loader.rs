// ============================================================
// Layer 4 — IMDB Review Loader
// ============================================================
// Reads the extracted Large Movie Review Dataset:
//
//   aclImdb/
//     train/pos/*.txt   train/neg/*.txt
//     test/pos/*.txt    test/neg/*.txt
//
// Positive reviews are returned before negative ones, each group
// in file-name order; the training DataLoader shuffles later.

use anyhow::{Context, Result};
use std::{
    fs,
    path::PathBuf,
};

use crate::data::preprocessor::Preprocessor;
use crate::domain::review::{Review, Sentiment};
use crate::domain::traits::{ReviewSource, Split};
use crate::error::SentimentError;

/// Loads tokenised reviews from an `aclImdb` directory.
pub struct ImdbLoader {
    root:         PathBuf,
    preprocessor: Preprocessor,
}

impl ImdbLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), preprocessor: Preprocessor::new() }
    }

    fn load_polarity(&self, split: Split, label: Sentiment) -> Result<Vec<Review>> {
        let dir = self.root.join(split.dir_name()).join(label.dir_name());

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("Cannot read review directory '{}'", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("txt"))
            .collect();
        paths.sort();

        let mut reviews = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)
                .with_context(|| format!("Cannot read '{}'", path.display()))?;
            let text = String::from_utf8_lossy(&bytes);
            reviews.push(Review::new(self.preprocessor.tokenize(&text), label));
        }

        tracing::debug!(
            "Read {} {} reviews from '{}'",
            reviews.len(),
            label,
            dir.display()
        );
        Ok(reviews)
    }
}

impl ReviewSource for ImdbLoader {
    fn load(&self, split: Split) -> Result<Vec<Review>> {
        let mut reviews = self.load_polarity(split, Sentiment::Positive)?;
        reviews.extend(self.load_polarity(split, Sentiment::Negative)?);

        if reviews.is_empty() {
            let name = self.root.join(split.dir_name()).display().to_string();
            return Err(SentimentError::EmptyDataset(name).into());
        }

        tracing::info!(
            "Loaded {} {} reviews from '{}'",
            reviews.len(),
            split.dir_name(),
            self.root.display()
        );
        Ok(reviews)
    }
}

/// Writes a miniature aclImdb tree for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::{fs, path::Path};

    pub const POSITIVE: &[&str] = &[
        "A great film, truly great acting and a great story.",
        "Loved it! Great cast, great music, wonderful film.",
        "Wonderful and great. I loved the story.",
        "Great fun, the film is wonderful.",
    ];

    pub const NEGATIVE: &[&str] = &[
        "A bad film. Awful acting and a bad story.",
        "Terrible, bad, awful. I hated the film.",
        "Bad music, bad cast, awful story.",
        "Awful film; the acting is bad.",
    ];

    pub fn write_imdb_tree(root: &Path) {
        for split in ["train", "test"] {
            for (polarity, texts) in [("pos", POSITIVE), ("neg", NEGATIVE)] {
                let dir = root.join(split).join(polarity);
                fs::create_dir_all(&dir).unwrap();
                for (i, text) in texts.iter().enumerate() {
                    fs::write(dir.join(format!("{i}_7.txt")), format!("{text}\n")).unwrap();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_positive_then_negative() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_imdb_tree(tmp.path());

        let reviews = ImdbLoader::new(tmp.path()).load(Split::Train).unwrap();
        assert_eq!(reviews.len(), 8);
        assert!(reviews[..4].iter().all(|r| r.label == Sentiment::Positive));
        assert!(reviews[4..].iter().all(|r| r.label == Sentiment::Negative));
        assert_eq!(reviews[0].tokens[..3], ["a", "great", "film"]);
    }

    #[test]
    fn test_ignores_non_txt_files() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_imdb_tree(tmp.path());
        fs::write(tmp.path().join("test/pos/urls.dat"), "http://x").unwrap();

        let reviews = ImdbLoader::new(tmp.path()).load(Split::Test).unwrap();
        assert_eq!(reviews.len(), 8);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ImdbLoader::new(tmp.path().join("nope")).load(Split::Train).is_err());
    }
}
