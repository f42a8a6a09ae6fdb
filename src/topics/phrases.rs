// Phrase mining: corpus-wide frequent bigrams.
//
// Bigrams are generated per document (never across document boundaries),
// then counted over the whole corpus. The result is a set: a bigram that
// clears the support threshold anywhere counts as a phrase everywhere it
// appears, even in documents where it occurs only once.

use std::collections::{HashMap, HashSet};

/// Minimum corpus-wide occurrences for a bigram to count as a phrase.
pub const DEFAULT_MIN_SUPPORT: usize = 3;

/// Adjacent-token bigrams of one document, each as "left right".
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// The set of bigrams whose corpus-wide count meets the support threshold.
#[derive(Debug, Clone, Default)]
pub struct FrequentBigrams {
    phrases: HashSet<String>,
}

impl FrequentBigrams {
    /// Count every document's bigrams and keep those seen at least
    /// `min_support` times across the corpus.
    pub fn mine(per_document: &[Vec<String>], min_support: usize) -> Self {
        let counts = count_bigrams(per_document);
        let phrases = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_support)
            .map(|(bigram, _)| bigram)
            .collect();
        Self { phrases }
    }

    /// Build a set directly from known phrases.
    pub fn from_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, bigram: &str) -> bool {
        self.phrases.contains(bigram)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrases in sorted order, for logging and display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut phrases: Vec<&str> = self.phrases.iter().map(String::as_str).collect();
        phrases.sort_unstable();
        phrases
    }
}

/// Reduce step: exact-string bigram counts over all documents.
fn count_bigrams(per_document: &[Vec<String>]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for doc in per_document {
        for bigram in doc {
            *counts.entry(bigram.clone()).or_insert(0) += 1;
        }
    }
    counts
}
