// Colored terminal output for topic summaries.
//
// Each topic prints as a small bar chart: one row per term, bar length
// proportional to its 0-100 weight, colored by weight band.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::topics::{Topic, TopicSummary};

const BAR_WIDTH: usize = 30;

/// Display a topic summary, or a hint when there is nothing to show.
pub fn display_summary(summary: Option<&TopicSummary>) {
    let Some(summary) = summary else {
        println!("No topics yet. Collect more tweets with `topic-cloud fetch` and try again.");
        return;
    };

    let age = summary.age(Utc::now());
    println!(
        "\n{}",
        format!(
            "=== Topics: {} ({} topics, generated {}s ago) ===",
            summary.time_frame,
            summary.topics.len(),
            age.num_seconds().max(0)
        )
        .bold()
    );

    for topic in &summary.topics {
        display_topic(topic);
    }
    println!();
}

/// Display topics that were never stamped or stored (`extract`).
pub fn display_topics(topics: &[Topic]) {
    if topics.is_empty() {
        println!("No topics extracted.");
        return;
    }
    for topic in topics {
        display_topic(topic);
    }
    println!();
}

fn display_topic(topic: &Topic) {
    println!("\n  {}", format!("Topic {}", topic.topic_id).cyan().bold());
    let width = topic
        .terms
        .iter()
        .map(|t| t.term.chars().count())
        .max()
        .unwrap_or(0);

    for term in &topic.terms {
        println!(
            "  {:<width$}  {} {:>5.1}",
            term.term,
            colorize_weight(term.weight, &weight_bar(term.weight, BAR_WIDTH)),
            term.weight,
        );
    }
}

/// Serialized form printed by `--json`.
pub fn summary_json(summary: Option<&TopicSummary>) -> Result<String> {
    match summary {
        Some(s) => Ok(serde_json::to_string_pretty(s)?),
        // An empty list rather than null, so consumers can always iterate
        None => Ok("[]".to_string()),
    }
}

/// A bar of `width * weight / 100` blocks. Out-of-range weights are clamped.
pub fn weight_bar(weight: f64, width: usize) -> String {
    let fraction = if weight.is_finite() {
        (weight / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    "█".repeat(filled.max(1))
}

/// Colorize by weight band.
fn colorize_weight(weight: f64, text: &str) -> colored::ColoredString {
    if weight >= 75.0 {
        text.red().bold()
    } else if weight >= 50.0 {
        text.yellow()
    } else if weight >= 25.0 {
        text.green()
    } else {
        text.dimmed()
    }
}
