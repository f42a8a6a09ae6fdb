// Topic extractor trait: swap-ready abstraction.
//
// The service layer only needs "documents in, topics out (or nothing)". The
// default implementation is the LDA pipeline; tests substitute their own.

use anyhow::Result;

use super::format::Topic;

/// Trait for turning a batch of documents into topics.
pub trait TopicExtractor: Send + Sync {
    /// Analyze a batch of texts. `Ok(None)` means "not enough signal, keep
    /// whatever you had before".
    fn extract(
        &self,
        documents: &[String],
        num_topics: usize,
        max_words: usize,
    ) -> Result<Option<Vec<Topic>>>;
}
