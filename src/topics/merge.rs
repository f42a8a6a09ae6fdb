// Term merging: fold frequent bigrams into single phrase tokens.
//
// For each of a document's bigrams that is in the frequent set, emit one
// underscore-joined phrase token and retire the words it was built from.
// The final sequence is the surviving unigrams in their original order,
// followed by the phrase tokens in emission order.
//
// Bigram strings normally split into exactly two words, but the frequent set
// can come from anywhere, so every part count is handled:
//   0 parts  → skipped
//   1 part   → emitted as-is, retired only if the document contains it
//   2+ parts → joined with '_', every part retired

use std::collections::HashSet;

use super::phrases::FrequentBigrams;

/// Separator used when joining phrase parts into one token.
pub const PHRASE_JOINER: char = '_';

/// Merge a document's filtered tokens with its frequent bigrams.
pub fn merge_terms(tokens: &[String], bigrams: &[String], frequent: &FrequentBigrams) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::new();
    let mut retired: HashSet<&str> = HashSet::new();

    for bigram in bigrams.iter().filter(|b| frequent.contains(b)) {
        let parts: Vec<&str> = bigram.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            [single] => {
                phrases.push(single.to_string());
                if tokens.iter().any(|t| t == single) {
                    retired.insert(*single);
                }
            }
            _ => {
                phrases.push(parts.join(&PHRASE_JOINER.to_string()));
                retired.extend(parts.iter().copied());
            }
        }
    }

    tokens
        .iter()
        .filter(|t| !retired.contains(t.as_str()))
        .cloned()
        .chain(phrases)
        .collect()
}
