// Tweet source trait: where new posts come from.
//
// The service layer asks for `count` posts and stores whatever comes back.
// Sources never touch the database themselves.

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::NewTweet;

#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Short name for logs ("openai", "twitter").
    fn name(&self) -> &str;

    /// Acquire up to `count` posts. An empty batch is a valid answer.
    async fn fetch(&self, count: usize) -> Result<Vec<NewTweet>>;
}
