//! Listing page parser: one rendered snapshot into match stubs.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

use crate::error::ScrapeError;
use crate::model::MatchStub;
use crate::normalize::{canonicalize_primary_odds, to_float};

/// Stubs retained from one listing snapshot plus per-row failures.
pub struct ListingExtraction {
    pub stubs: Vec<MatchStub>,
    pub errors: Vec<ScrapeError>,
}

/// Parser for the listing view enumerating a feed's matches by league.
pub struct ListingParser;

impl ListingParser {
    /// Extract all same-day match stubs from a rendered listing snapshot.
    ///
    /// Rows whose date token does not equal `today` are dropped silently;
    /// rows missing a required field are recorded as match-level errors
    /// without aborting the rest of the table.
    pub fn extract(snapshot: &str, today: NaiveDate) -> ListingExtraction {
        let document = Html::parse_document(snapshot);
        let table_selector = Selector::parse("table.l-t").unwrap();
        let header_selector = Selector::parse("a.l-th-name").unwrap();
        let row_selector = Selector::parse("tr.g-tr").unwrap();
        let date_re = Regex::new(r"^(\d{2}/\d{2})\s+(\d{2}:\d{2})$").unwrap();
        let today_token = today.format("%d/%m").to_string();

        let mut extraction = ListingExtraction {
            stubs: Vec::new(),
            errors: Vec::new(),
        };

        for table in document.select(&table_selector) {
            let league = table
                .select(&header_selector)
                .next()
                .map(|a| league_name(&a.text().collect::<String>()))
                .unwrap_or_default();

            for row in table.select(&row_selector) {
                match Self::parse_row(&row, &league, &date_re, &today_token, today) {
                    Ok(Some(stub)) => extraction.stubs.push(stub),
                    Ok(None) => {}
                    Err(reason) => {
                        warn!("skipping match row in league {:?}: {}", league, reason);
                        extraction.errors.push(ScrapeError::MatchParse {
                            league: league.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        extraction
    }

    fn parse_row(
        row: &scraper::ElementRef,
        league: &str,
        date_re: &Regex,
        today_token: &str,
        today: NaiveDate,
    ) -> Result<Option<MatchStub>, String> {
        let date_selector = Selector::parse("div.g-date").unwrap();
        let label = row
            .select(&date_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .ok_or_else(|| "missing date label".to_string())?;

        let caps = date_re
            .captures(&label)
            .ok_or_else(|| format!("malformed date label {:?}", label))?;
        if &caps[1] != today_token {
            return Ok(None);
        }
        let kickoff_time = caps[2].to_string();

        let team_selector = Selector::parse("p").unwrap();
        let teams: Vec<String> = row
            .select(&team_selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        if teams.len() != 2 {
            return Err(format!("expected 2 team names, found {}", teams.len()));
        }

        let link_selector = Selector::parse("a.g-d.g-d-s.line").unwrap();
        let detail_link = row
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.to_string())
            .ok_or_else(|| "missing detail link".to_string())?;

        let odds_selector = Selector::parse("td.cf").unwrap();
        let raw_odds: Vec<f64> = row
            .select(&odds_selector)
            // Cells with extra decorator classes are UI annotations, not prices.
            .filter(|cell| cell.value().classes().count() == 1)
            .map(|cell| to_float(&cell.text().collect::<String>()))
            .collect();

        Ok(Some(MatchStub {
            league: league.to_string(),
            kickoff_time,
            kickoff_date: today,
            team_home: teams[0].clone(),
            team_away: teams[1].clone(),
            primary_odds: canonicalize_primary_odds(raw_odds),
            detail_link,
        }))
    }
}

/// Derive a league name from its header label by dropping the first two
/// tokens (sport and region prefix).
fn league_name(label: &str) -> String {
    label
        .split_whitespace()
        .skip(2)
        .collect::<Vec<_>>()
        .join(" ")
}
