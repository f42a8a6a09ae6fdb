use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::db::models::TimeFrame;
use crate::topics::pipeline::{DEFAULT_MAX_WORDS, DEFAULT_NUM_TOPICS};
use crate::topics::PipelineConfig;

/// Where new posts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Synthetic posts from a chat-completion model (default), needs OPENAI_API_KEY
    OpenAi,
    /// Live recent-search results, needs BEARER_TOKEN
    Twitter,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(SourceKind::OpenAi),
            "twitter" => Ok(SourceKind::Twitter),
            other => anyhow::bail!("Unknown TWEET_SOURCE '{other}' (expected openai or twitter)"),
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub tweet_source: SourceKind,
    pub openai_api_key: String,
    pub openai_model: String,
    pub bearer_token: String,
    /// Subject for synthetic posts, search query for live ones
    pub tweet_query: String,
    pub tweets_per_fetch: usize,
    pub polling_interval_secs: u64,
    /// Age after which a stored topic summary no longer counts as fresh
    pub time_update_topic_secs: u64,
    pub num_topics: usize,
    pub max_words_per_topic: usize,
    pub extra_stopwords: Vec<String>,
    /// Time frames the poller refreshes after each acquisition
    pub poll_time_frames: Vec<TimeFrame>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./topic-cloud.db".to_string(),
            tweet_source: SourceKind::OpenAi,
            openai_api_key: String::new(),
            openai_model: "gpt-3.5-turbo".to_string(),
            bearer_token: String::new(),
            tweet_query: "bitcoin".to_string(),
            tweets_per_fetch: 10,
            polling_interval_secs: 3600,
            time_update_topic_secs: 60,
            num_topics: DEFAULT_NUM_TOPICS,
            max_words_per_topic: DEFAULT_MAX_WORDS,
            extra_stopwords: Vec::new(),
            poll_time_frames: TimeFrame::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default. Credentials are only checked when a
    /// command actually needs them (see `require_source`).
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let tweet_source = match env::var("TWEET_SOURCE") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => defaults.tweet_source,
        };

        Ok(Self {
            db_path: env::var("TOPIC_CLOUD_DB_PATH").unwrap_or(defaults.db_path),
            tweet_source,
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            bearer_token: env::var("BEARER_TOKEN").unwrap_or_default(),
            tweet_query: env::var("TWEET_QUERY").unwrap_or(defaults.tweet_query),
            tweets_per_fetch: env_number("TWEETS_PER_FETCH", defaults.tweets_per_fetch)?,
            polling_interval_secs: env_number("POLLING_INTERVAL", defaults.polling_interval_secs)?,
            time_update_topic_secs: env_number(
                "TIME_UPDATE_TOPIC",
                defaults.time_update_topic_secs,
            )?,
            num_topics: env_number("NUM_TOPICS", defaults.num_topics)?,
            max_words_per_topic: env_number("MAX_WORDS_PER_TOPIC", defaults.max_words_per_topic)?,
            extra_stopwords: env::var("TOPIC_CLOUD_EXTRA_STOPWORDS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            poll_time_frames: defaults.poll_time_frames,
        })
    }

    /// Check that the configured source has its credential.
    /// Call this before any operation that acquires new posts.
    pub fn require_source(&self) -> Result<()> {
        match self.tweet_source {
            SourceKind::OpenAi if self.openai_api_key.is_empty() => anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file,\n\
                 or set TWEET_SOURCE=twitter and provide BEARER_TOKEN instead."
            ),
            SourceKind::Twitter if self.bearer_token.is_empty() => anyhow::bail!(
                "BEARER_TOKEN not set. Add it to your .env file,\n\
                 or set TWEET_SOURCE=openai and provide OPENAI_API_KEY instead."
            ),
            _ => Ok(()),
        }
    }

    /// Pipeline tunables with this deployment's extra stopwords applied.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            extra_stopwords: self.extra_stopwords.clone(),
            ..PipelineConfig::default()
        }
    }
}

fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{v}'")),
        _ => Ok(default),
    }
}

/// Comma-separated list, lowercased, blanks dropped.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
