// Background poller: periodic acquisition followed by topic refresh.
//
// Runs as a tokio task. Each tick fetches a batch of tweets, then re-extracts
// topics for every configured time frame. Failures are logged and the loop
// carries on; only the stop signal ends it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::topics::TopicService;
use super::tweets::{TweetService, DEFAULT_TWEET_LIMIT};
use crate::db::models::TimeFrame;

pub struct Poller {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling loop. The first tick runs immediately.
    pub fn start(
        tweets: Arc<TweetService>,
        topics: Arc<TopicService>,
        time_frames: Vec<TimeFrame>,
        interval: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Poller started");
            loop {
                poll_once(&tweets, &topics, &time_frames).await;

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = stop_rx.changed() => break,
                }
            }
            info!("Poller stopped");
        });

        Self { stop_tx, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal the loop and wait up to `timeout` for it to finish. A tick
    /// still running after that is aborted. Returns true on a clean exit.
    pub async fn stop(self, timeout: Duration) -> bool {
        // Receiver gone means the task already ended
        let _ = self.stop_tx.send(true);

        let mut handle = self.handle;
        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Poller task ended abnormally");
                false
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Poller did not stop in time, aborting");
                handle.abort();
                false
            }
        }
    }
}

/// One acquisition round plus a topic refresh per time frame.
pub async fn poll_once(tweets: &TweetService, topics: &TopicService, time_frames: &[TimeFrame]) {
    if let Err(e) = tweets.update_tweets().await {
        error!(error = %format!("{e:#}"), "Tweet update failed");
    }

    for &time_frame in time_frames {
        let texts = match tweets.get_texts(time_frame, DEFAULT_TWEET_LIMIT).await {
            Ok(texts) => texts,
            Err(e) => {
                error!(%time_frame, error = %format!("{e:#}"), "Reading tweets failed");
                continue;
            }
        };
        if let Err(e) = topics.update_topics(texts, time_frame).await {
            error!(%time_frame, error = %format!("{e:#}"), "Topic update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewTweet;
    use crate::db::Database;
    use crate::sources::TweetSource;
    use crate::topics::traits::TopicExtractor;
    use crate::topics::{Topic, TopicTerm};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TweetSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, count: usize) -> Result<Vec<NewTweet>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("rate limited");
            }
            Ok((0..count)
                .map(|i| NewTweet::new(format!("round {n} post {i}")))
                .collect())
        }
    }

    struct OneTopic;

    impl TopicExtractor for OneTopic {
        fn extract(&self, _: &[String], _: usize, _: usize) -> Result<Option<Vec<Topic>>> {
            Ok(Some(vec![Topic {
                topic_id: 0,
                terms: vec![TopicTerm {
                    term: "mempool".to_string(),
                    weight: 100.0,
                }],
            }]))
        }
    }

    fn services(
        db: Arc<dyn Database>,
        source: Arc<CountingSource>,
    ) -> (Arc<TweetService>, Arc<TopicService>) {
        let tweets = Arc::new(TweetService::new(db.clone()).with_source(source, 3));
        let topics = Arc::new(TopicService::new(db, Arc::new(OneTopic), 5, 10, 60));
        (tweets, topics)
    }

    #[tokio::test]
    async fn test_poll_once_fetches_and_refreshes() {
        let db = crate::db::open_in_memory().unwrap();
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let (tweets, topics) = services(db.clone(), source);

        poll_once(&tweets, &topics, &[TimeFrame::Latest, TimeFrame::Day]).await;

        assert_eq!(db.tweet_count().await.unwrap(), 3);
        assert!(db.latest_topic_summary("latest").await.unwrap().is_some());
        assert!(db.latest_topic_summary("day").await.unwrap().is_some());
        assert!(db.latest_topic_summary("week").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stop_interrupts_sleep() {
        let db = crate::db::open_in_memory().unwrap();
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let (tweets, topics) = services(db.clone(), source.clone());

        let poller = Poller::start(
            tweets,
            topics,
            vec![TimeFrame::Latest],
            Duration::from_secs(3600),
        );
        for _ in 0..100 {
            if db.summary_count().await.unwrap() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(poller.is_running());
        assert!(poller.stop(Duration::from_secs(1)).await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loop_survives_source_failures() {
        let db = crate::db::open_in_memory().unwrap();
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let (tweets, topics) = services(db.clone(), source.clone());

        let poller = Poller::start(
            tweets,
            topics,
            vec![TimeFrame::Latest],
            Duration::from_millis(10),
        );
        for _ in 0..200 {
            if source.calls.load(Ordering::SeqCst) >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(poller.stop(Duration::from_secs(1)).await);
        assert!(source.calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(db.tweet_count().await.unwrap(), 0);
    }
}
