//! CLI commands for betline.
//!
//! Supports a full scrape run and a feed inspection mode.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::feeds::load_feeds;
use crate::scrape::{self, DriverProvider};
use crate::storage::schema::table_name;
use crate::storage::MatchRepository;

#[derive(Parser)]
#[command(name = "betline")]
#[command(version, about = "Betline: same-day match odds scraper for zenit.win", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every configured feed and store today's matches
    Run {
        /// Feed file override
        #[arg(short, long)]
        feeds: Option<PathBuf>,

        /// Database file override
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Worker count override
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Collect matches for this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Run the browser with a visible window
        #[arg(long)]
        headed: bool,
    },

    /// List the configured feeds and exit
    Feeds {
        /// Feed file override
        #[arg(short, long)]
        feeds: Option<PathBuf>,
    },
}

/// Run a full scrape over the configured feeds.
pub async fn run_scrape(
    feeds_path: Option<PathBuf>,
    database: Option<PathBuf>,
    concurrency: Option<usize>,
    date: Option<NaiveDate>,
    headed: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(path) = feeds_path {
        config.scrape.feeds_file = path.to_string_lossy().to_string();
    }
    if let Some(path) = database {
        config.storage.db_path = path.to_string_lossy().to_string();
    }
    if let Some(n) = concurrency {
        config.scrape.concurrency = n;
    }
    if headed {
        config.webdriver.headless = false;
    }
    let today = date.unwrap_or_else(|| Local::now().date_naive());

    let feeds = load_feeds(Path::new(&config.scrape.feeds_file))?;
    tracing::info!(
        "Loaded {} feeds from {}",
        feeds.len(),
        config.scrape.feeds_file
    );
    tracing::info!("Collecting matches dated {}", today.format("%d/%m"));

    let provider = Arc::new(DriverProvider::new(config.webdriver.clone()));
    let result = scrape::run(provider, feeds, &config.scrape, today).await;

    tracing::info!(
        "Run finished: {} matches, {} errors",
        result.matches.len(),
        result.errors.len()
    );
    for error in &result.errors {
        tracing::warn!("{}", error);
    }

    let mut repository = MatchRepository::new(Path::new(&config.storage.db_path))?;
    let written = repository.insert_matches(today, &result.matches)?;
    let total = repository.count_for_day(today)?;
    tracing::info!(
        "Stored {} records in table {} of {} ({} for the day)",
        written,
        table_name(today),
        config.storage.db_path,
        total
    );

    Ok(())
}

/// Print the configured feeds.
pub async fn run_feeds(feeds_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = feeds_path {
        config.scrape.feeds_file = path.to_string_lossy().to_string();
    }

    let feeds = load_feeds(Path::new(&config.scrape.feeds_file))?;
    for feed in &feeds {
        println!("{:12} {:12} {}", feed.sport, feed.country, feed.url);
    }
    println!("{} feeds", feeds.len());

    Ok(())
}
