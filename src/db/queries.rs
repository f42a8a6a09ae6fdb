// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{NewTweet, StoredTweet, TimeFrame};
use crate::topics::{Topic, TopicSummary};

// --- Tweets ---

/// Insert a batch of tweets in one transaction. Tweets without a timestamp
/// are stamped with `now`. Returns how many rows were written.
pub fn save_tweets(conn: &Connection, tweets: &[NewTweet], now: DateTime<Utc>) -> Result<usize> {
    if tweets.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO tweets (text, source, timestamp) VALUES (?1, ?2, ?3)")?;
        for tweet in tweets {
            let ts = tweet.timestamp.unwrap_or(now).timestamp();
            stmt.execute(params![tweet.text, tweet.source, ts])?;
        }
    }
    tx.commit().context("Failed to commit tweet batch")?;
    Ok(tweets.len())
}

/// Newest-first tweets inside the time frame's window.
pub fn get_tweets(
    conn: &Connection,
    time_frame: TimeFrame,
    limit: u32,
    now: DateTime<Utc>,
) -> Result<Vec<StoredTweet>> {
    // Latest has no lower bound
    let since = time_frame.since(now).map(|t| t.timestamp()).unwrap_or(i64::MIN);

    let mut stmt = conn.prepare(
        "SELECT id, text, source, timestamp
         FROM tweets
         WHERE timestamp >= ?1
         ORDER BY timestamp DESC, id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![since, limit], |row| {
        let ts: i64 = row.get(3)?;
        Ok(StoredTweet {
            id: row.get(0)?,
            text: row.get(1)?,
            source: row.get(2)?,
            timestamp: DateTime::from_timestamp(ts, 0).unwrap_or_default(),
        })
    })?;

    let mut tweets = Vec::new();
    for row in rows {
        tweets.push(row?);
    }
    Ok(tweets)
}

pub fn tweet_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM tweets", [], |row| row.get(0))?;
    Ok(count)
}

// --- Topic summaries ---

/// Append a topic summary and return its row id.
pub fn save_topic_summary(conn: &Connection, summary: &TopicSummary) -> Result<i64> {
    let topics_json = serde_json::to_string(&summary.topics)?;
    conn.execute(
        "INSERT INTO topic_summaries (time_frame, topics_json, generated_at)
         VALUES (?1, ?2, ?3)",
        params![
            summary.time_frame,
            topics_json,
            summary.generated_at.timestamp()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The newest summary for a time frame, if any.
pub fn latest_topic_summary(conn: &Connection, time_frame: &str) -> Result<Option<TopicSummary>> {
    let mut stmt = conn.prepare(
        "SELECT topics_json, generated_at
         FROM topic_summaries
         WHERE time_frame = ?1
         ORDER BY generated_at DESC, id DESC
         LIMIT 1",
    )?;

    let row: Option<(String, i64)> = stmt
        .query_row(params![time_frame], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?;

    match row {
        Some((json, generated_at)) => {
            let topics: Vec<Topic> = serde_json::from_str(&json)
                .with_context(|| format!("Corrupt topic summary for '{time_frame}'"))?;
            Ok(Some(TopicSummary::new(
                topics,
                time_frame,
                DateTime::from_timestamp(generated_at, 0).unwrap_or_default(),
            )))
        }
        None => Ok(None),
    }
}

pub fn summary_count(conn: &Connection) -> Result<i64> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM topic_summaries", [], |row| row.get(0))?;
    Ok(count)
}
