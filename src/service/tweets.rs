// Tweet service: acquisition from the configured source, then persistence.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::db::models::{StoredTweet, TimeFrame};
use crate::db::Database;
use crate::sources::TweetSource;

/// Default page size for time-frame reads.
pub const DEFAULT_TWEET_LIMIT: u32 = 100;

pub struct TweetService {
    db: Arc<dyn Database>,
    source: Option<Arc<dyn TweetSource>>,
    batch_size: usize,
}

impl TweetService {
    /// Read-only service: can list stored tweets but not acquire new ones.
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            source: None,
            batch_size: 0,
        }
    }

    /// Attach a source that `update_tweets` pulls `batch_size` posts from.
    pub fn with_source(mut self, source: Arc<dyn TweetSource>, batch_size: usize) -> Self {
        self.source = Some(source);
        self.batch_size = batch_size;
        self
    }

    /// Newest-first stored tweets inside the time frame.
    pub async fn get_tweets(&self, time_frame: TimeFrame, limit: u32) -> Result<Vec<StoredTweet>> {
        self.db.get_tweets(time_frame, limit).await
    }

    /// Texts only, in the same order as `get_tweets`.
    pub async fn get_texts(&self, time_frame: TimeFrame, limit: u32) -> Result<Vec<String>> {
        Ok(self
            .get_tweets(time_frame, limit)
            .await?
            .into_iter()
            .map(|t| t.text)
            .collect())
    }

    /// One acquisition round. Returns how many tweets were stored.
    pub async fn update_tweets(&self) -> Result<usize> {
        let source = self
            .source
            .as_ref()
            .context("No tweet source configured")?;

        let tweets = source
            .fetch(self.batch_size)
            .await
            .with_context(|| format!("Fetching from {} failed", source.name()))?;

        if tweets.is_empty() {
            warn!(source = source.name(), "Source returned no tweets");
            return Ok(0);
        }

        let saved = self.db.save_tweets(&tweets).await?;
        info!(source = source.name(), saved, "Stored new tweets");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewTweet;
    use async_trait::async_trait;

    struct FixedSource(Vec<&'static str>);

    #[async_trait]
    impl TweetSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, count: usize) -> Result<Vec<NewTweet>> {
            Ok(self.0.iter().take(count).map(|t| NewTweet::new(*t)).collect())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl TweetSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self, _count: usize) -> Result<Vec<NewTweet>> {
            anyhow::bail!("upstream unavailable")
        }
    }

    #[tokio::test]
    async fn test_update_tweets_stores_batch() {
        let db = crate::db::open_in_memory().unwrap();
        let source = Arc::new(FixedSource(vec!["one", "two", "three"]));
        let service = TweetService::new(db.clone()).with_source(source, 2);

        assert_eq!(service.update_tweets().await.unwrap(), 2);
        assert_eq!(db.tweet_count().await.unwrap(), 2);
        assert_eq!(service.get_texts(TimeFrame::Day, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_tweets_empty_batch() {
        let db = crate::db::open_in_memory().unwrap();
        let service = TweetService::new(db).with_source(Arc::new(FixedSource(vec![])), 10);
        assert_eq!(service.update_tweets().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_tweets_without_source_fails() {
        let db = crate::db::open_in_memory().unwrap();
        assert!(TweetService::new(db).update_tweets().await.is_err());
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let db = crate::db::open_in_memory().unwrap();
        let service = TweetService::new(db).with_source(Arc::new(BrokenSource), 10);
        let err = service.update_tweets().await.unwrap_err();
        assert!(format!("{err:#}").contains("upstream unavailable"));
    }
}
