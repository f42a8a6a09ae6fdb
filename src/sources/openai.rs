// Synthetic posts from an OpenAI chat-completion model.
//
// The model is asked for a JSON array of {text, source} objects. Replies
// often come wrapped in Markdown code fences, so those are stripped before
// parsing. Anything that still isn't a JSON array is an error.
//
// API docs: https://platform.openai.com/docs/api-reference/chat

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::TweetSource;
use crate::db::models::NewTweet;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiSource {
    client: Client,
    api_key: String,
    model: String,
    subject: String,
}

impl OpenAiSource {
    pub fn new(api_key: String, model: String, subject: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            subject,
        }
    }

    fn prompt(&self, count: usize) -> String {
        format!(
            "Return {count} tweets about {} trends, news, and insights. \
             Format as JSON array with 'text' and 'source' fields.",
            self.subject
        )
    }
}

#[async_trait]
impl TweetSource for OpenAiSource {
    fn name(&self) -> &str {
        "openai"
    }

    async fn fetch(&self, count: usize) -> Result<Vec<NewTweet>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You provide JSON data only.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: self.prompt(count),
                },
            ],
            temperature: 1.0,
            max_tokens: 800,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call OpenAI chat completions")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI returned {}: {}", status, body);
        }

        let result: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("OpenAI response had no choices")?;

        let tweets = parse_generated_tweets(&content)?;
        debug!(requested = count, generated = tweets.len(), "Generated synthetic tweets");
        Ok(tweets)
    }
}

/// Pull the payload out of a reply that may be wrapped in ``` fences.
pub fn strip_code_fences(reply: &str) -> &str {
    let text = reply.trim();
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest
    } else if let Some((_, rest)) = text.split_once("```") {
        rest
    } else {
        return text;
    };
    body.split_once("```").map_or(body, |(inner, _)| inner).trim()
}

/// Parse a model reply into posts. Entries with blank text are dropped.
pub fn parse_generated_tweets(reply: &str) -> Result<Vec<NewTweet>> {
    let payload = strip_code_fences(reply);
    let generated: Vec<GeneratedTweet> = serde_json::from_str(payload)
        .context("Model reply was not a JSON array of {text, source} objects")?;

    Ok(generated
        .into_iter()
        .filter(|g| !g.text.trim().is_empty())
        .map(|g| NewTweet {
            text: g.text,
            source: g.source,
            timestamp: None,
        })
        .collect())
}

// --- OpenAI request/response types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct GeneratedTweet {
    text: String,
    #[serde(default)]
    source: Option<String>,
}
