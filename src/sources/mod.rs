// Post acquisition: synthetic (chat-completion) or live (recent search).
//
// Both implement TweetSource so the poller and CLI don't care which one
// the deployment picked via TWEET_SOURCE.

pub mod openai;
pub mod traits;
pub mod twitter;

pub use traits::TweetSource;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, SourceKind};

/// Build the source named by the config. Fails if its credential is missing.
pub fn from_config(config: &Config) -> Result<Arc<dyn TweetSource>> {
    config.require_source()?;
    let source: Arc<dyn TweetSource> = match config.tweet_source {
        SourceKind::OpenAi => Arc::new(openai::OpenAiSource::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.tweet_query.clone(),
        )),
        SourceKind::Twitter => Arc::new(twitter::TwitterSource::new(
            config.bearer_token.clone(),
            config.tweet_query.clone(),
        )),
    };
    Ok(source)
}
