//! Error taxonomy for the extraction pipeline.
//!
//! Every variant is scoped: a feed-level failure aborts one feed, a
//! match-level failure aborts one match, a category-level failure omits
//! one category. Nothing here ever aborts the whole run.

use std::time::Duration;

use thiserror::Error;

/// Failures raised by a rendering session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    #[error("webdriver error: {0}")]
    Driver(String),
}

/// Failures recorded while extracting one feed.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Listing page unreachable or never settled. Aborts the feed.
    #[error("listing page failed to load: {source}")]
    FeedLoad {
        #[source]
        source: SessionError,
    },

    /// Malformed listing row. The row is skipped, the table continues.
    #[error("unparsable match row in league {league:?}: {reason}")]
    MatchParse { league: String, reason: String },

    /// Detail page unreachable. The match keeps its primary odds and an
    /// empty odds set.
    #[error("detail page for {fixture} failed to load: {source}")]
    DetailLoad {
        fixture: String,
        #[source]
        source: SessionError,
    },

    /// Optional category panel absent or its tables never appeared.
    /// The category is omitted, the rest of the match is kept.
    #[error("category {category:?} unavailable for {fixture}: {reason}")]
    CategoryExtract {
        fixture: String,
        category: &'static str,
        reason: String,
    },
}
