// Tokenization and stopword filtering.
//
// Splits normalized post text on whitespace, lowercases, and drops anything
// in the combined stopword set: the English list from the `stop-words` crate
// plus a domain list for the subject being tracked (its own name variants,
// retweet and short-link markers, subject hashtags).

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

/// Domain stopwords for the tracked subject. Every post mentions the subject
/// itself, so its name variants would otherwise dominate every topic.
pub const DOMAIN_STOPWORDS: &[&str] = &[
    "https",
    "http",
    "co",
    "rt",
    "amp",
    "bitcoin",
    "btc",
    "#btc",
    "#bitcoin",
    "#cryptocurrency",
    "#crypto",
    "bitcoin's",
    "$btc",
];

/// Characters kept when they lead a token: hashtags, handles, cashtags.
const KEPT_PREFIXES: &[char] = &['#', '@', '$'];

/// Whitespace tokenizer with a fixed stopword set.
pub struct Tokenizer {
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Build a tokenizer from the English list, the domain list and any
    /// extra words from configuration.
    pub fn new(extra_stopwords: &[String]) -> Self {
        let english: Vec<String> = get(LANGUAGE::English);
        let stopwords = english
            .into_iter()
            .chain(DOMAIN_STOPWORDS.iter().map(|s| s.to_string()))
            .chain(extra_stopwords.iter().cloned())
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stopwords }
    }

    /// Split a normalized document into filtered tokens.
    ///
    /// Order and duplicates are preserved. A document can legitimately come
    /// out empty (all links, all stopwords).
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|raw| clean_token(&raw.to_lowercase()))
            .filter(|token| !token.is_empty() && !self.is_stopword(token))
            .collect()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }
}

/// Trim punctuation from both ends of a lowercased token, keeping a single
/// leading '#', '@' or '$'.
fn clean_token(token: &str) -> String {
    let (prefix, rest) = match token.chars().next() {
        Some(c) if KEPT_PREFIXES.contains(&c) => (Some(c), &token[c.len_utf8()..]),
        _ => (None, token),
    };

    let core = rest.trim_matches(|c: char| c.is_ascii_punctuation() || c == '…');
    if core.is_empty() {
        return String::new();
    }

    match prefix {
        Some(p) => format!("{p}{core}"),
        None => core.to_string(),
    }
}
