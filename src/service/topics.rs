// Topic service: runs extraction off the async runtime and caches results.
//
// Extraction is CPU-bound, so it runs on tokio's blocking pool. Only one
// extraction is in flight at a time; a call that finds one running is
// skipped rather than queued.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::tweets::{TweetService, DEFAULT_TWEET_LIMIT};
use crate::db::models::TimeFrame;
use crate::db::Database;
use crate::topics::traits::TopicExtractor;
use crate::topics::TopicSummary;

pub struct TopicService {
    db: Arc<dyn Database>,
    extractor: Arc<dyn TopicExtractor>,
    num_topics: usize,
    max_words: usize,
    staleness: Duration,
    in_flight: Mutex<()>,
}

impl TopicService {
    pub fn new(
        db: Arc<dyn Database>,
        extractor: Arc<dyn TopicExtractor>,
        num_topics: usize,
        max_words: usize,
        staleness_secs: u64,
    ) -> Self {
        Self {
            db,
            extractor,
            num_topics,
            max_words,
            staleness: Duration::seconds(i64::try_from(staleness_secs).unwrap_or(i64::MAX)),
            in_flight: Mutex::new(()),
        }
    }

    /// Extract topics from `texts`, stamp and store the summary.
    ///
    /// `Ok(None)` when the extractor had nothing to say, or when another
    /// extraction was already running. Nothing is stored in either case.
    pub async fn update_topics(
        &self,
        texts: Vec<String>,
        time_frame: TimeFrame,
    ) -> Result<Option<TopicSummary>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            info!(%time_frame, "Topic extraction already running, skipping");
            return Ok(None);
        };

        let documents = texts.len();
        let extractor = Arc::clone(&self.extractor);
        let (num_topics, max_words) = (self.num_topics, self.max_words);

        let topics = tokio::task::spawn_blocking(move || {
            extractor.extract(&texts, num_topics, max_words)
        })
        .await
        .context("Topic extraction task panicked")??;

        let Some(topics) = topics else {
            warn!(%time_frame, documents, "No topics extracted");
            return Ok(None);
        };

        let summary = TopicSummary::new(topics, time_frame.as_str(), Utc::now());
        let id = self.db.save_topic_summary(&summary).await?;
        info!(
            %time_frame,
            documents,
            topics = summary.topics.len(),
            id,
            "Stored topic summary"
        );
        Ok(Some(summary))
    }

    /// The stored summary if it exists, is fresh, and no update is forced.
    pub async fn get_topics(
        &self,
        time_frame: TimeFrame,
        force_update: bool,
    ) -> Result<Option<TopicSummary>> {
        if force_update {
            return Ok(None);
        }

        let Some(summary) = self.db.latest_topic_summary(time_frame.as_str()).await? else {
            return Ok(None);
        };

        let age = summary.age(Utc::now());
        if age > self.staleness {
            debug!(%time_frame, age_secs = age.num_seconds(), "Stored summary is stale");
            return Ok(None);
        }
        Ok(Some(summary))
    }

    /// Cached summary if fresh, otherwise extract from the stored tweets
    /// for the same time frame.
    pub async fn current_topics(
        &self,
        tweets: &TweetService,
        time_frame: TimeFrame,
        force_update: bool,
    ) -> Result<Option<TopicSummary>> {
        if let Some(summary) = self.get_topics(time_frame, force_update).await? {
            return Ok(Some(summary));
        }
        let texts = tweets.get_texts(time_frame, DEFAULT_TWEET_LIMIT).await?;
        self.update_topics(texts, time_frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::{Topic, TopicTerm};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns one fixed topic, or nothing below three documents.
    struct StubExtractor {
        calls: AtomicUsize,
        delay: std::time::Duration,
    }

    impl StubExtractor {
        fn new() -> Self {
            Self::slow(std::time::Duration::ZERO)
        }

        fn slow(delay: std::time::Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl TopicExtractor for StubExtractor {
        fn extract(
            &self,
            documents: &[String],
            _num_topics: usize,
            _max_words: usize,
        ) -> Result<Option<Vec<Topic>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            if documents.len() < 3 {
                return Ok(None);
            }
            Ok(Some(vec![Topic {
                topic_id: 0,
                terms: vec![TopicTerm {
                    term: "halving".to_string(),
                    weight: 100.0,
                }],
            }]))
        }
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("post {i}")).collect()
    }

    #[tokio::test]
    async fn test_update_stores_summary() {
        let db = crate::db::open_in_memory().unwrap();
        let service = TopicService::new(db.clone(), Arc::new(StubExtractor::new()), 5, 10, 60);

        let summary = service
            .update_topics(texts(5), TimeFrame::Day)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.time_frame, "day");
        assert_eq!(db.summary_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_result_stores_nothing() {
        let db = crate::db::open_in_memory().unwrap();
        let service = TopicService::new(db.clone(), Arc::new(StubExtractor::new()), 5, 10, 60);

        assert!(service
            .update_topics(texts(1), TimeFrame::Latest)
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.summary_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_topics_freshness() {
        let db = crate::db::open_in_memory().unwrap();
        let service = TopicService::new(db.clone(), Arc::new(StubExtractor::new()), 5, 10, 60);

        assert!(service.get_topics(TimeFrame::Week, false).await.unwrap().is_none());

        service.update_topics(texts(5), TimeFrame::Week).await.unwrap();
        assert!(service.get_topics(TimeFrame::Week, false).await.unwrap().is_some());
        assert!(service.get_topics(TimeFrame::Week, true).await.unwrap().is_none());
        // Other time frames are cached separately
        assert!(service.get_topics(TimeFrame::Day, false).await.unwrap().is_none());

        let old = TopicSummary::new(Vec::new(), "day", Utc::now() - Duration::minutes(5));
        db.save_topic_summary(&old).await.unwrap();
        assert!(service.get_topics(TimeFrame::Day, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_update_is_skipped() {
        let db = crate::db::open_in_memory().unwrap();
        let extractor = Arc::new(StubExtractor::slow(std::time::Duration::from_millis(300)));
        let service = Arc::new(TopicService::new(db.clone(), extractor.clone(), 5, 10, 60));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.update_topics(texts(5), TimeFrame::Day).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let second = service.update_topics(texts(5), TimeFrame::Day).await.unwrap();
        assert!(second.is_none());

        assert!(first.await.unwrap().unwrap().is_some());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(db.summary_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_current_topics_reads_tweets_then_caches() {
        let db = crate::db::open_in_memory().unwrap();
        let extractor = Arc::new(StubExtractor::new());
        let topics = TopicService::new(db.clone(), extractor.clone(), 5, 10, 60);
        let tweets = TweetService::new(db.clone());

        let batch: Vec<_> = texts(4)
            .into_iter()
            .map(crate::db::models::NewTweet::new)
            .collect();
        db.save_tweets(&batch).await.unwrap();

        let first = topics
            .current_topics(&tweets, TimeFrame::Latest, false)
            .await
            .unwrap();
        assert!(first.is_some());
        let second = topics
            .current_topics(&tweets, TimeFrame::Latest, false)
            .await
            .unwrap();
        assert_eq!(first.unwrap().topics, second.unwrap().topics);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }
}
