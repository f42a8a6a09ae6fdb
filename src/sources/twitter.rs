// Live posts from the X/Twitter v2 recent-search endpoint.
//
// Auth is an app-only bearer token. The endpoint accepts 10..=100 results
// per request; only English posts are kept.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::traits::TweetSource;
use crate::db::models::NewTweet;

const RECENT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

const MIN_RESULTS: usize = 10;
const MAX_RESULTS: usize = 100;

pub struct TwitterSource {
    client: Client,
    bearer_token: String,
    query: String,
}

impl TwitterSource {
    pub fn new(bearer_token: String, query: String) -> Self {
        Self {
            client: Client::new(),
            bearer_token,
            query,
        }
    }
}

#[async_trait]
impl TweetSource for TwitterSource {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn fetch(&self, count: usize) -> Result<Vec<NewTweet>> {
        let max_results = clamp_max_results(count).to_string();

        let response = self
            .client
            .get(RECENT_SEARCH_URL)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", self.query.as_str()),
                ("tweet.fields", "created_at,lang"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .context("Failed to call Twitter recent search")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Twitter returned {}: {}", status, body);
        }

        let result: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Twitter search response")?;

        let tweets = english_tweets(result);
        debug!(query = %self.query, kept = tweets.len(), "Fetched recent tweets");
        Ok(tweets)
    }
}

/// The endpoint rejects max_results outside [10, 100].
pub fn clamp_max_results(count: usize) -> usize {
    count.clamp(MIN_RESULTS, MAX_RESULTS)
}

pub fn permalink(id: &str) -> String {
    format!("https://twitter.com/i/web/status/{id}")
}

/// Keep English posts and map them to storable tweets.
fn english_tweets(response: SearchResponse) -> Vec<NewTweet> {
    response
        .data
        .unwrap_or_default()
        .into_iter()
        .filter(|t| t.lang.as_deref() == Some("en"))
        .map(|t| NewTweet {
            source: Some(permalink(&t.id)),
            timestamp: t.created_at,
            text: t.text,
        })
        .collect()
}

/// Parse a raw recent-search body. Used by tests and debugging.
pub fn parse_search_response(body: &str) -> Result<Vec<NewTweet>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("Failed to parse Twitter search response")?;
    Ok(english_tweets(response))
}

// --- Twitter v2 response types ---

#[derive(Deserialize)]
struct SearchResponse {
    /// Absent when the search matched nothing
    #[serde(default)]
    data: Option<Vec<SearchTweet>>,
}

#[derive(Deserialize)]
struct SearchTweet {
    id: String,
    text: String,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}
