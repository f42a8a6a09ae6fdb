// Data models: Rust structs that map to database rows.
//
// These are the types that flow between sources, services and storage.
// They're separate from the queries so other modules can use them without
// depending on rusqlite directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A freshly acquired post, not yet stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTweet {
    pub text: String,
    /// Permalink for live posts, or the generator for synthetic ones
    #[serde(default)]
    pub source: Option<String>,
    /// When the post was made. Defaults to "now" at save time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewTweet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            timestamp: None,
        }
    }
}

/// A post as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTweet {
    pub id: i64,
    pub text: String,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The window a tweet query or topic summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    /// Most recent tweets regardless of age
    Latest,
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 3] = [TimeFrame::Latest, TimeFrame::Day, TimeFrame::Week];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Latest => "latest",
            TimeFrame::Day => "day",
            TimeFrame::Week => "week",
        }
    }

    /// How far back the window reaches, or `None` for no limit.
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeFrame::Latest => None,
            TimeFrame::Day => Some(Duration::seconds(86_400)),
            TimeFrame::Week => Some(Duration::seconds(604_800)),
        }
    }

    /// Oldest timestamp included in the window, relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(TimeFrame::Latest),
            "day" => Ok(TimeFrame::Day),
            "week" => Ok(TimeFrame::Week),
            other => anyhow::bail!("Unknown time frame '{other}' (expected latest, day or week)"),
        }
    }
}
