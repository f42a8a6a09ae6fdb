// Count vectorization: vocabulary building and sparse term-count vectors.
//
// The vocabulary is ordered by corpus-wide term frequency (ties broken
// alphabetically so runs are reproducible) and capped. Terms that fall off
// the cap are silently dropped from the document vectors.

use std::collections::HashMap;

use anyhow::Result;

/// Default cap on vocabulary size.
pub const DEFAULT_VOCAB_SIZE: usize = 5000;

/// Indexed set of terms the topic model works over.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

/// One document as sorted (term index, count) pairs. Empty means the
/// document had no vocabulary terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentVector {
    pub entries: Vec<(usize, u32)>,
}

impl DocumentVector {
    /// Total number of tokens counted in this document.
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fits a vocabulary over final token sequences and turns documents into
/// term-count vectors.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    /// Maximum number of distinct terms kept
    pub vocab_size: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self {
            vocab_size: DEFAULT_VOCAB_SIZE,
            min_df: 1,
        }
    }
}

impl CountVectorizer {
    /// Build the vocabulary. Fails if no term survives (empty corpus or
    /// every document reduced to nothing).
    pub fn fit(&self, documents: &[Vec<String>]) -> Result<Vocabulary> {
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for doc in documents {
            let mut seen_here: Vec<&str> = Vec::new();
            for token in doc {
                *term_freq.entry(token.as_str()).or_insert(0) += 1;
                if !seen_here.contains(&token.as_str()) {
                    seen_here.push(token.as_str());
                }
            }
            for term in seen_here {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| doc_freq.get(term).copied().unwrap_or(0) >= self.min_df)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.vocab_size);

        if ranked.is_empty() {
            anyhow::bail!(
                "Cannot build a vocabulary from {} documents: no terms survived filtering",
                documents.len()
            );
        }

        let terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Ok(Vocabulary { terms, index })
    }
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Count the in-vocabulary tokens of one document.
    pub fn vectorize(&self, tokens: &[String]) -> DocumentVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in tokens {
            if let Some(idx) = self.index_of(token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(usize, u32)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|(idx, _)| *idx);
        DocumentVector { entries }
    }
}
