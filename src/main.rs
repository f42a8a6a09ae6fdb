use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use topic_cloud::config::Config;
use topic_cloud::db::models::TimeFrame;
use topic_cloud::db::Database;
use topic_cloud::output::terminal;
use topic_cloud::service::{Poller, TopicService, TweetService};
use topic_cloud::topics::TopicPipeline;

/// Topic Cloud: trending topics from short social-media posts.
///
/// Collects posts about a subject, extracts recurring topics and phrases
/// with LDA, and prints them as weighted term lists.
#[derive(Parser)]
#[command(name = "topic-cloud", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Extract topics from a file with one post per line
    Extract {
        /// Newline-delimited input file
        file: PathBuf,

        /// Number of topics to request (default: NUM_TOPICS)
        #[arg(long)]
        num_topics: Option<usize>,

        /// Terms per topic (default: MAX_WORDS_PER_TOPIC)
        #[arg(long)]
        max_words: Option<usize>,

        /// Print JSON instead of bar charts
        #[arg(long)]
        json: bool,
    },

    /// Fetch one batch of tweets from the configured source
    Fetch,

    /// Show topics for a time frame, extracting fresh ones if the cache is stale
    Topics {
        /// latest, day or week
        #[arg(long, default_value = "latest")]
        time_frame: TimeFrame,

        /// Ignore the cached summary and re-extract
        #[arg(long)]
        refresh: bool,

        /// Print JSON instead of bar charts
        #[arg(long)]
        json: bool,
    },

    /// Fetch and re-extract on a timer until Ctrl-C
    Poll {
        /// Seconds between rounds (default: POLLING_INTERVAL)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show system status (DB stats, summary age per time frame)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topic_cloud=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing Topic Cloud database...");
            let db = topic_cloud::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: set TWEET_SOURCE and its credential in your .env file");
            println!("Then run: topic-cloud fetch");
        }

        Commands::Extract {
            file,
            num_topics,
            max_words,
            json,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let documents: Vec<String> = raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();

            let pipeline = TopicPipeline::new(config.pipeline_config())?;
            let spinner = spinner(&format!("Extracting topics from {} posts", documents.len()))?;
            let topics = pipeline.extract_topics(
                &documents,
                num_topics.unwrap_or(config.num_topics),
                max_words.unwrap_or(config.max_words_per_topic),
            )?;
            spinner.finish_and_clear();

            let topics = topics.unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else {
                terminal::display_topics(&topics);
            }
        }

        Commands::Fetch => {
            let db = topic_cloud::db::open_sqlite(&config.db_path)?;
            let tweets = tweet_service(&config, db.clone())?;
            let saved = tweets.update_tweets().await?;
            println!(
                "Stored {} new tweets ({} total)",
                saved.to_string().bold(),
                db.tweet_count().await?
            );
        }

        Commands::Topics {
            time_frame,
            refresh,
            json,
        } => {
            let db = topic_cloud::db::open_sqlite(&config.db_path)?;
            let tweets = TweetService::new(db.clone());
            let topics = topic_service(&config, db)?;

            let spinner = spinner(&format!("Loading {time_frame} topics"))?;
            let summary = topics.current_topics(&tweets, time_frame, refresh).await?;
            spinner.finish_and_clear();

            if json {
                println!("{}", terminal::summary_json(summary.as_ref())?);
            } else {
                terminal::display_summary(summary.as_ref());
            }
        }

        Commands::Poll { interval } => {
            let db = topic_cloud::db::open_sqlite(&config.db_path)?;
            let tweets = Arc::new(tweet_service(&config, db.clone())?);
            let topics = Arc::new(topic_service(&config, db)?);
            let interval = Duration::from_secs(interval.unwrap_or(config.polling_interval_secs));

            let poller = Poller::start(tweets, topics, config.poll_time_frames.clone(), interval);
            println!(
                "Polling every {}s. Press {} to stop.",
                interval.as_secs(),
                "Ctrl-C".bold()
            );

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            println!("\nStopping...");
            if !poller.is_running() {
                println!("{}", "Poller had already exited".yellow());
            }
            if !poller.stop(Duration::from_secs(1)).await {
                println!("{}", "Poller did not finish cleanly".yellow());
            }
        }

        Commands::Status => {
            if std::path::Path::new(&config.db_path).exists() {
                let db = topic_cloud::db::open_sqlite(&config.db_path)?;
                topic_cloud::status::show(&db, &config.db_path).await?;
            } else {
                println!("Database: not initialized");
                println!("\nRun `topic-cloud init` to set up the database.");
            }
        }
    }

    Ok(())
}

fn tweet_service(config: &Config, db: Arc<dyn Database>) -> Result<TweetService> {
    let source = topic_cloud::sources::from_config(config)?;
    Ok(TweetService::new(db).with_source(source, config.tweets_per_fetch))
}

fn topic_service(config: &Config, db: Arc<dyn Database>) -> Result<TopicService> {
    let pipeline = TopicPipeline::new(config.pipeline_config())?;
    Ok(TopicService::new(
        db,
        Arc::new(pipeline),
        config.num_topics,
        config.max_words_per_topic,
        config.time_update_topic_secs,
    ))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("  {spinner} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
