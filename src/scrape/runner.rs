//! Bounded worker pool draining the feed queue.
//!
//! Each worker owns exactly one rendering session for its whole life;
//! sessions are never shared or handed between workers. Feed failures
//! and per-match failures are collected, never propagated, so one bad
//! feed cannot sink the run.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, SessionError};
use crate::model::{Feed, Match, RunError, RunResult};
use crate::scrape::listing::ListingParser;
use crate::scrape::navigator::Navigator;
use crate::scrape::session::{Locator, Session, SessionProvider};

/// Container wrapping the listing tables on a feed page.
pub const LISTING_CONTAINER_ID: &str = "divmain";

/// Scrape every feed with a pool of session-owning workers.
///
/// Spawns up to `config.concurrency` workers, each of which opens its
/// own session and pulls feeds off a shared queue until it is empty.
/// Feeds left queued because no worker could open a session are
/// reported as feed-level errors.
pub async fn run<P>(
    provider: Arc<P>,
    feeds: Vec<Feed>,
    config: &ScrapeConfig,
    today: NaiveDate,
) -> RunResult
where
    P: SessionProvider + 'static,
{
    let queue = Arc::new(Mutex::new(feeds.into_iter().collect::<VecDeque<_>>()));
    let results = Arc::new(Mutex::new(RunResult::default()));
    let workers = config.concurrency.max(1);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let provider = Arc::clone(&provider);
        let queue = Arc::clone(&queue);
        let results = Arc::clone(&results);
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            worker_loop(worker_id, provider, queue, results, config, today).await;
        }));
    }
    for handle in handles {
        if let Err(e) = handle.await {
            error!("worker task panicked: {}", e);
        }
    }

    let mut leftover = queue.lock().await;
    let mut results = results.lock().await;
    while let Some(feed) = leftover.pop_front() {
        results.errors.push(RunError {
            sport: feed.sport,
            country: feed.country,
            error: ScrapeError::FeedLoad {
                source: SessionError::Driver("no rendering session available".to_string()),
            },
        });
    }
    std::mem::take(&mut *results)
}

async fn worker_loop<P>(
    worker_id: usize,
    provider: Arc<P>,
    queue: Arc<Mutex<VecDeque<Feed>>>,
    results: Arc<Mutex<RunResult>>,
    config: ScrapeConfig,
    today: NaiveDate,
) where
    P: SessionProvider + 'static,
{
    let mut session = match provider.create().await {
        Ok(session) => session,
        Err(e) => {
            warn!("worker {} could not open a session: {}", worker_id, e);
            return;
        }
    };

    loop {
        let feed = { queue.lock().await.pop_front() };
        let Some(feed) = feed else { break };
        info!(
            "worker {} scraping {}/{}",
            worker_id, feed.sport, feed.country
        );
        let (matches, errors) = process_feed(&mut session, &feed, &config, today).await;
        let mut results = results.lock().await;
        results.matches.extend(matches);
        results.errors.extend(errors.into_iter().map(|error| RunError {
            sport: feed.sport.clone(),
            country: feed.country.clone(),
            error,
        }));
    }

    if let Err(e) = session.close().await {
        warn!("worker {} failed to close its session: {}", worker_id, e);
    }
}

/// Scrape one feed end to end: listing snapshot, same-day stubs, then
/// one detail navigation per stub.
///
/// A match whose detail page fails still produces a record carrying its
/// listing odds and an empty category set.
async fn process_feed<S: Session>(
    session: &mut S,
    feed: &Feed,
    config: &ScrapeConfig,
    today: NaiveDate,
) -> (Vec<Match>, Vec<ScrapeError>) {
    let snapshot = match load_listing(session, feed, config).await {
        Ok(snapshot) => snapshot,
        Err(source) => {
            return (Vec::new(), vec![ScrapeError::FeedLoad { source }]);
        }
    };

    let extraction = ListingParser::extract(&snapshot, today);
    let mut errors = extraction.errors;
    info!(
        "{}/{}: {} matches today, {} rows rejected",
        feed.sport,
        feed.country,
        extraction.stubs.len(),
        errors.len()
    );

    let navigator = Navigator::new(config);
    let mut matches = Vec::with_capacity(extraction.stubs.len());
    for stub in extraction.stubs {
        let outcome = navigator.navigate(session, &stub).await;
        errors.extend(outcome.errors);
        matches.push(Match::assemble(feed, stub, outcome.odds));
    }
    (matches, errors)
}

/// Load a feed page and return the listing container's outer markup.
///
/// Extraction is scoped to `#divmain`; tables rendered outside the
/// container never reach the parser.
async fn load_listing<S: Session>(
    session: &mut S,
    feed: &Feed,
    config: &ScrapeConfig,
) -> Result<String, SessionError> {
    session.load(&feed.url).await?;
    tokio::time::sleep(config.settle()).await;
    session
        .wait_for_presence(&Locator::id(LISTING_CONTAINER_ID), config.page_timeout())
        .await
}
