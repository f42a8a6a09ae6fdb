// Result formatting: raw model output to the topic summary users see.
//
// Phrase tokens get their underscores turned back into spaces, and weights
// are rescaled per topic so the strongest term is always exactly 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::merge::PHRASE_JOINER;

/// One labeled term with its normalized weight (0 to 100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

/// A single topic: its id in [0, K) and its terms, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: usize,
    pub terms: Vec<TopicTerm>,
}

/// The full output of one pipeline run, stamped by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topics: Vec<Topic>,
    /// Time window the source documents were drawn from ("latest", "day", ...)
    pub time_frame: String,
    pub generated_at: DateTime<Utc>,
}

impl TopicSummary {
    pub fn new(topics: Vec<Topic>, time_frame: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            topics,
            time_frame: time_frame.into(),
            generated_at,
        }
    }

    /// Age of the summary relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.generated_at)
    }
}

/// Turn a phrase token back into a human-readable label.
pub fn label_for(term: &str) -> String {
    term.replace(PHRASE_JOINER, " ")
}

/// Build one formatted topic from raw (term, model weight) pairs that are
/// already sorted by descending weight.
pub fn format_topic(topic_id: usize, raw_terms: &[(String, f64)]) -> Topic {
    let max_weight = raw_terms
        .iter()
        .map(|(_, w)| *w)
        .fold(f64::NEG_INFINITY, f64::max);
    // No terms, or nothing positive to scale by.
    let divisor = if max_weight.is_finite() && max_weight > 0.0 {
        max_weight
    } else {
        1.0
    };

    let terms = raw_terms
        .iter()
        .map(|(term, weight)| TopicTerm {
            term: label_for(term),
            weight: weight / divisor * 100.0,
        })
        .collect();

    Topic { topic_id, terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_top_term_is_exactly_100() {
        let topic = format_topic(0, &raw(&[("whales", 0.08), ("miners", 0.02)]));
        assert_eq!(topic.terms[0].weight, 100.0);
        assert!((topic.terms[1].weight - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_underscores_become_spaces() {
        let topic = format_topic(3, &raw(&[("spot_etf", 0.5), ("to_the_moon", 0.4)]));
        assert_eq!(topic.topic_id, 3);
        assert_eq!(topic.terms[0].term, "spot etf");
        assert_eq!(topic.terms[1].term, "to the moon");
    }

    #[test]
    fn test_empty_topic_has_no_terms() {
        let topic = format_topic(1, &[]);
        assert!(topic.terms.is_empty());
    }

    #[test]
    fn test_all_zero_weights_do_not_divide_by_zero() {
        let topic = format_topic(0, &raw(&[("a", 0.0), ("b", 0.0)]));
        assert!(topic.terms.iter().all(|t| t.weight == 0.0));
    }

    #[test]
    fn test_label_only_touches_underscores() {
        assert_eq!(label_for("cold_storage-wallet"), "cold storage-wallet");
        assert_eq!(label_for("#halving"), "#halving");
    }

    #[test]
    fn test_summary_serialization_shape() {
        let generated_at = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let summary = TopicSummary::new(
            vec![format_topic(0, &raw(&[("whales", 1.0)]))],
            "day",
            generated_at,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["time_frame"], "day");
        assert_eq!(json["topics"][0]["topic_id"], 0);
        assert_eq!(json["topics"][0]["terms"][0]["term"], "whales");
        assert_eq!(json["topics"][0]["terms"][0]["weight"], 100.0);

        let back: TopicSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}
