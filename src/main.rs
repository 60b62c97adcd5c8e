//! Betline: same-day odds collection from zenit.win line pages.
//!
//! CLI around a headless-browser scrape pipeline with SQLite storage.

mod cli;
mod config;
mod error;
mod feeds;
mod model;
mod normalize;
mod retry;
mod scrape;
mod storage;

use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            feeds,
            database,
            concurrency,
            date,
            headed,
        } => cli::run_scrape(feeds, database, concurrency, date, headed).await,
        Commands::Feeds { feeds } => cli::run_feeds(feeds).await,
    }
}
