// Composition tests: verifying that the layers chain together correctly.
//
// These tests exercise the data flow between modules:
//   stored tweets -> TopicPipeline -> TopicService -> stored summary -> cache
// against an in-memory database, with no network calls.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use topic_cloud::db::models::{NewTweet, TimeFrame};
use topic_cloud::db::Database;
use topic_cloud::output::terminal::summary_json;
use topic_cloud::service::poller::poll_once;
use topic_cloud::service::{TopicService, TweetService};
use topic_cloud::sources::TweetSource;
use topic_cloud::topics::{PipelineConfig, TopicPipeline, TopicSummary};

const POSTS: [&str; 12] = [
    "Spot ETF inflows keep climbing as institutions pile in",
    "Another record day for spot ETF inflows",
    "Miners brace for the halving as hashrate hits new highs",
    "Hashrate record again, miners are all in before the halving",
    "Lightning network capacity grows with new channels",
    "Lightning network adoption is quietly exploding",
    "Spot ETF inflows outpace gold funds this week",
    "Halving countdown: miners upgrading rigs",
    "Lightning network payments now accepted at more stores",
    "Whales accumulating while retail panics https://t.co/abc",
    "Whales moved 10k coins to cold storage www.example.com/tx",
    "Whales are back, on-chain data shows",
];

fn topic_service(db: Arc<dyn Database>, staleness_secs: u64) -> TopicService {
    topic_service_with_words(db, staleness_secs, 10)
}

fn topic_service_with_words(
    db: Arc<dyn Database>,
    staleness_secs: u64,
    max_words: usize,
) -> TopicService {
    let pipeline = TopicPipeline::new(PipelineConfig::default()).unwrap();
    TopicService::new(db, Arc::new(pipeline), 5, max_words, staleness_secs)
}

async fn seeded_db() -> Arc<dyn Database> {
    let db = topic_cloud::db::open_in_memory().unwrap();
    let tweets: Vec<NewTweet> = POSTS.iter().map(|p| NewTweet::new(*p)).collect();
    db.save_tweets(&tweets).await.unwrap();
    db
}

// ============================================================
// Chain: tweets -> pipeline -> stored summary
// ============================================================

#[tokio::test]
async fn stored_tweets_become_a_cached_summary() {
    let db = seeded_db().await;
    let tweets = TweetService::new(db.clone());
    // Room for the whole vocabulary, so every term shows up in every topic
    let topics = topic_service_with_words(db.clone(), 60, 500);

    assert!(topics.get_topics(TimeFrame::Day, false).await.unwrap().is_none());

    let summary = topics
        .current_topics(&tweets, TimeFrame::Day, false)
        .await
        .unwrap()
        .expect("twelve posts should produce topics");
    assert_eq!(summary.time_frame, "day");
    assert_eq!(summary.topics.len(), 5);
    let vocabulary = summary.topics[0].terms.len();
    for topic in &summary.topics {
        assert_eq!(topic.terms[0].weight, 100.0);
        assert_eq!(topic.terms.len(), vocabulary);
    }

    // Frequent phrases survive as spaced labels
    let labels: Vec<&str> = summary.topics[0]
        .terms
        .iter()
        .map(|term| term.term.as_str())
        .collect();
    assert!(labels.contains(&"spot etf"));
    assert!(labels.contains(&"etf inflows"));
    assert!(labels.contains(&"lightning network"));
    // ...and their parts are folded away
    assert!(!labels.contains(&"lightning"));
    assert!(labels.iter().all(|l| !l.contains("http") && !l.contains('_')));

    let cached = topics.get_topics(TimeFrame::Day, false).await.unwrap().unwrap();
    assert_eq!(cached.topics.len(), summary.topics.len());
    for (stored, fresh) in cached.topics.iter().zip(&summary.topics) {
        assert_eq!(stored.topic_id, fresh.topic_id);
        for (a, b) in stored.terms.iter().zip(&fresh.terms) {
            assert_eq!(a.term, b.term);
            assert!((a.weight - b.weight).abs() < 1e-9);
        }
    }
    assert_eq!(db.summary_count().await.unwrap(), 1);
}

#[tokio::test]
async fn forced_refresh_appends_history() {
    let db = seeded_db().await;
    let tweets = TweetService::new(db.clone());
    let topics = topic_service(db.clone(), 60);

    topics
        .current_topics(&tweets, TimeFrame::Latest, false)
        .await
        .unwrap();
    topics
        .current_topics(&tweets, TimeFrame::Latest, true)
        .await
        .unwrap();
    assert_eq!(db.summary_count().await.unwrap(), 2);
}

#[tokio::test]
async fn stale_summary_is_not_served() {
    let db = seeded_db().await;
    let topics = topic_service(db.clone(), 60);

    let old = TopicSummary::new(Vec::new(), "week", Utc::now() - Duration::seconds(120));
    db.save_topic_summary(&old).await.unwrap();
    assert!(topics.get_topics(TimeFrame::Week, false).await.unwrap().is_none());
}

#[tokio::test]
async fn too_few_tweets_stores_nothing() {
    let db = topic_cloud::db::open_in_memory().unwrap();
    db.save_tweets(&[NewTweet::new("only one post about miners")])
        .await
        .unwrap();
    let tweets = TweetService::new(db.clone());
    let topics = topic_service(db.clone(), 60);

    let summary = topics
        .current_topics(&tweets, TimeFrame::Latest, false)
        .await
        .unwrap();
    assert!(summary.is_none());
    assert_eq!(summary_json(summary.as_ref()).unwrap(), "[]");
    assert_eq!(db.summary_count().await.unwrap(), 0);
}

#[tokio::test]
async fn old_tweets_fall_outside_the_day_window() {
    let db = topic_cloud::db::open_in_memory().unwrap();
    let week_old: Vec<NewTweet> = POSTS
        .iter()
        .map(|p| NewTweet {
            text: p.to_string(),
            source: None,
            timestamp: Some(Utc::now() - Duration::days(3)),
        })
        .collect();
    db.save_tweets(&week_old).await.unwrap();

    let tweets = TweetService::new(db.clone());
    let topics = topic_service(db.clone(), 60);

    assert!(topics
        .current_topics(&tweets, TimeFrame::Day, false)
        .await
        .unwrap()
        .is_none());
    assert!(topics
        .current_topics(&tweets, TimeFrame::Week, false)
        .await
        .unwrap()
        .is_some());
}

// ============================================================
// Chain: source -> poll round -> summaries
// ============================================================

struct CannedSource;

#[async_trait]
impl TweetSource for CannedSource {
    fn name(&self) -> &str {
        "canned"
    }

    async fn fetch(&self, count: usize) -> anyhow::Result<Vec<NewTweet>> {
        Ok(POSTS.iter().take(count).map(|p| NewTweet::new(*p)).collect())
    }
}

#[tokio::test]
async fn one_poll_round_fills_every_time_frame() {
    let db = topic_cloud::db::open_in_memory().unwrap();
    let tweets = TweetService::new(db.clone()).with_source(Arc::new(CannedSource), 12);
    let topics = topic_service(db.clone(), 60);

    poll_once(&tweets, &topics, &TimeFrame::ALL).await;

    assert_eq!(db.tweet_count().await.unwrap(), 12);
    for time_frame in TimeFrame::ALL {
        assert!(
            topics.get_topics(time_frame, false).await.unwrap().is_some(),
            "no summary for {time_frame}"
        );
    }
}
