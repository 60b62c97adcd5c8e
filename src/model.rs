//! Typed records produced by the extraction pipeline.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::error::ScrapeError;

/// One listing feed: a (sport, country) pair with its listing URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub sport: String,
    pub country: String,
    pub url: String,
}

/// One retained listing row, before detail navigation.
#[derive(Debug, Clone)]
pub struct MatchStub {
    pub league: String,
    pub kickoff_time: String,
    pub kickoff_date: chrono::NaiveDate,
    pub team_home: String,
    pub team_away: String,
    /// Canonical 11-column odds schema: W1 X W2 H1 HV1 H2 HV2 M T B extra.
    pub primary_odds: Vec<f64>,
    pub detail_link: String,
}

impl MatchStub {
    /// Human-readable match identifier used in logs and errors.
    pub fn fixture(&self) -> String {
        format!("{} - {}", self.team_home, self.team_away)
    }
}

/// The closed set of supplementary odds categories offered on detail pages.
///
/// Declaration order is the fixed order categories are attempted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OddsCategory {
    GoalScored,
    CornerTotal,
    CornerTotalFirstHalf,
    FoulsTotal,
    FoulsTotalFirstHalf,
}

impl OddsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsCategory::GoalScored => "Match will score a goal",
            OddsCategory::CornerTotal => "Corner individual total",
            OddsCategory::CornerTotalFirstHalf => "Corner individual total 1st half",
            OddsCategory::FoulsTotal => "Fouls individual total",
            OddsCategory::FoulsTotalFirstHalf => "Fouls individual total 1st half",
        }
    }
}

/// Odds quoted for one outcome: yes/no pairs on the goal table,
/// over/exact/under triples on category tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OddsValues {
    Pair([f64; 2]),
    Triple([f64; 3]),
}

/// Supplementary odds for one match, keyed by category.
///
/// A category absent from the map means "not offered on this page"; a
/// present category with no outcomes means its table rendered empty.
#[derive(Debug, Clone, Default)]
pub struct OddsSet {
    categories: BTreeMap<OddsCategory, BTreeMap<String, OddsValues>>,
}

impl OddsSet {
    pub fn insert_category(
        &mut self,
        category: OddsCategory,
        outcomes: BTreeMap<String, OddsValues>,
    ) {
        self.categories.insert(category, outcomes);
    }

    pub fn category(&self, category: OddsCategory) -> Option<&BTreeMap<String, OddsValues>> {
        self.categories.get(&category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Serialize for OddsSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, outcomes) in &self.categories {
            map.serialize_entry(category.as_str(), outcomes)?;
        }
        map.end()
    }
}

/// Final assembled record, one per retained match.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub sport: String,
    pub country: String,
    pub league: String,
    pub kickoff_time: String,
    pub kickoff_date: chrono::NaiveDate,
    pub team_home: String,
    pub team_away: String,
    pub primary_odds: Vec<f64>,
    pub odds: OddsSet,
}

impl Match {
    /// Merge a feed, its retained stub and the collected odds into the
    /// final record. Pure combination, cannot fail.
    pub fn assemble(feed: &Feed, stub: MatchStub, odds: OddsSet) -> Match {
        Match {
            sport: feed.sport.clone(),
            country: feed.country.clone(),
            league: stub.league,
            kickoff_time: stub.kickoff_time,
            kickoff_date: stub.kickoff_date,
            team_home: stub.team_home,
            team_away: stub.team_away,
            primary_odds: stub.primary_odds,
            odds,
        }
    }
}

/// One recorded failure, attributed to the feed it occurred in.
#[derive(Debug, Error)]
#[error("{sport}/{country}: {error}")]
pub struct RunError {
    pub sport: String,
    pub country: String,
    pub error: ScrapeError,
}

/// Aggregated output of one full run across all feeds.
#[derive(Debug, Default)]
pub struct RunResult {
    pub matches: Vec<Match>,
    pub errors: Vec<RunError>,
}
