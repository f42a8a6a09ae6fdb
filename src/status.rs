// System status display: DB stats, newest tweet, summary age per time frame.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

use crate::db::models::TimeFrame;
use crate::db::Database;
use crate::output::truncate_chars;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `topic-cloud init` to set up the database.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let tweet_count = db.tweet_count().await?;
    println!("Tweets stored: {}", tweet_count);
    match db.get_tweets(TimeFrame::Latest, 1).await?.first() {
        Some(newest) => println!(
            "  Newest ({}): {}",
            newest.timestamp.format("%Y-%m-%d %H:%M UTC"),
            truncate_chars(&newest.text, 80)
        ),
        None => println!("  Run `topic-cloud fetch` to collect some"),
    }

    println!("Topic summaries: {} stored", db.summary_count().await?);
    let now = Utc::now();
    for time_frame in TimeFrame::ALL {
        match db.latest_topic_summary(time_frame.as_str()).await? {
            Some(summary) => println!(
                "  {:<7} {} topics, {} old",
                time_frame.as_str(),
                summary.topics.len(),
                format_age(summary.age(now).num_seconds())
            ),
            None => println!("  {:<7} never extracted", time_frame.as_str()),
        }
    }

    Ok(())
}

fn format_age(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(-3), "0s");
        assert_eq!(format_age(59), "59s");
        assert_eq!(format_age(125), "2m");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(200_000), "2d");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
