// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across an .await point.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{NewTweet, StoredTweet, TimeFrame};
use super::traits::Database;
use crate::topics::TopicSummary;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn save_tweets(&self, tweets: &[NewTweet]) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::save_tweets(&conn, tweets, Utc::now())
    }

    async fn get_tweets(&self, time_frame: TimeFrame, limit: u32) -> Result<Vec<StoredTweet>> {
        let conn = self.conn.lock().await;
        super::queries::get_tweets(&conn, time_frame, limit, Utc::now())
    }

    async fn tweet_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::tweet_count(&conn)
    }

    async fn save_topic_summary(&self, summary: &TopicSummary) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::save_topic_summary(&conn, summary)
    }

    async fn latest_topic_summary(&self, time_frame: &str) -> Result<Option<TopicSummary>> {
        let conn = self.conn.lock().await;
        super::queries::latest_topic_summary(&conn, time_frame)
    }

    async fn summary_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::summary_count(&conn)
    }
}
