// Database trait: async interface for everything the services store.
//
// SqliteDatabase is the only implementor. Methods are async so callers in
// the poller and CLI can hold an `Arc<dyn Database>` without caring that
// rusqlite is synchronous underneath.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{NewTweet, StoredTweet, TimeFrame};
use crate::topics::TopicSummary;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Tweets ---

    /// Store a batch of tweets. Returns how many were written.
    async fn save_tweets(&self, tweets: &[NewTweet]) -> Result<usize>;

    /// Newest-first tweets inside the time frame, at most `limit`.
    async fn get_tweets(&self, time_frame: TimeFrame, limit: u32) -> Result<Vec<StoredTweet>>;

    async fn tweet_count(&self) -> Result<i64>;

    // --- Topic summaries ---

    /// Append a summary to the history and return its row id.
    async fn save_topic_summary(&self, summary: &TopicSummary) -> Result<i64>;

    /// The most recently generated summary for a time frame.
    async fn latest_topic_summary(&self, time_frame: &str) -> Result<Option<TopicSummary>>;

    async fn summary_count(&self) -> Result<i64>;
}
