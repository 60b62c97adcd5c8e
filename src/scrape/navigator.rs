//! Detail page navigation state machine.
//!
//! One match's detail view is driven through a fixed sequence of states:
//! the initial goal table on load, then each optional category panel in
//! declared order. Every panel is independently optional; a panel that
//! never appears costs its two categories and nothing else.

use tracing::debug;

use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, SessionError};
use crate::model::{MatchStub, OddsCategory, OddsSet};
use crate::retry::{retry, RetryConfig};
use crate::scrape::detail::{DetailParser, GOAL_TABLE_ID};
use crate::scrape::detail_url;
use crate::scrape::session::{Locator, Session};

/// Optional category panels on a detail page, in visit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Corners,
    Fouls,
}

impl Panel {
    fn control_label(&self) -> &'static str {
        match self {
            Panel::Corners => "Угловые",
            Panel::Fouls => "Фолы",
        }
    }

    /// Result table container ids: (full match, first half).
    fn table_ids(&self) -> (&'static str, &'static str) {
        match self {
            Panel::Corners => ("table_266", "table_272"),
            Panel::Fouls => ("table_278", "table_284"),
        }
    }

    fn categories(&self) -> (OddsCategory, OddsCategory) {
        match self {
            Panel::Corners => (
                OddsCategory::CornerTotal,
                OddsCategory::CornerTotalFirstHalf,
            ),
            Panel::Fouls => (OddsCategory::FoulsTotal, OddsCategory::FoulsTotalFirstHalf),
        }
    }

    fn control_locator(&self) -> Locator {
        Locator::xpath(format!(
            "//div[contains(@class, 'line-base-filter-item') and text()='{}']",
            self.control_label()
        ))
    }
}

/// Navigation states over one match's detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavState {
    Loaded,
    CategoryAttempt(Panel),
    Done,
}

impl NavState {
    fn next(self) -> NavState {
        match self {
            NavState::Loaded => NavState::CategoryAttempt(Panel::Corners),
            NavState::CategoryAttempt(Panel::Corners) => NavState::CategoryAttempt(Panel::Fouls),
            NavState::CategoryAttempt(Panel::Fouls) => NavState::Done,
            NavState::Done => NavState::Done,
        }
    }
}

/// Odds collected from one detail view plus the failures seen on the way.
#[derive(Debug)]
pub struct NavOutcome {
    pub odds: OddsSet,
    pub errors: Vec<ScrapeError>,
}

/// Drives one session through a match's detail view.
pub struct Navigator<'a> {
    config: &'a ScrapeConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(config: &'a ScrapeConfig) -> Self {
        Self { config }
    }

    /// Navigate the detail view and collect every offered odds category.
    ///
    /// Never fails past this boundary: an unreachable detail page yields
    /// an empty odds set plus a match-level error, a failed panel yields
    /// its category-level errors, and everything else comes back as data.
    pub async fn navigate<S: Session>(&self, session: &mut S, stub: &MatchStub) -> NavOutcome {
        let mut outcome = NavOutcome {
            odds: OddsSet::default(),
            errors: Vec::new(),
        };

        if let Err(source) = self.enter(session, stub).await {
            outcome.errors.push(ScrapeError::DetailLoad {
                fixture: stub.fixture(),
                source,
            });
            return outcome;
        }

        let mut state = NavState::Loaded;
        loop {
            match state {
                NavState::Loaded => {
                    let markup = match session.current_markup().await {
                        Ok(markup) => markup,
                        Err(source) => {
                            outcome.errors.push(ScrapeError::DetailLoad {
                                fixture: stub.fixture(),
                                source,
                            });
                            return outcome;
                        }
                    };
                    if let Some(outcomes) = DetailParser::goal_table(&markup) {
                        outcome.odds.insert_category(OddsCategory::GoalScored, outcomes);
                    }
                }
                NavState::CategoryAttempt(panel) => {
                    if let Err(reason) = self.attempt_panel(session, panel, &mut outcome.odds).await
                    {
                        debug!(
                            "panel {:?} skipped for {}: {}",
                            panel,
                            stub.fixture(),
                            reason
                        );
                        let (full, half) = panel.categories();
                        outcome.errors.push(ScrapeError::CategoryExtract {
                            fixture: stub.fixture(),
                            category: full.as_str(),
                            reason: reason.clone(),
                        });
                        outcome.errors.push(ScrapeError::CategoryExtract {
                            fixture: stub.fixture(),
                            category: half.as_str(),
                            reason,
                        });
                    }
                }
                NavState::Done => break,
            }
            state = state.next();
        }

        outcome
    }

    /// Load the detail page and wait for its initial odds table.
    async fn enter<S: Session>(
        &self,
        session: &mut S,
        stub: &MatchStub,
    ) -> Result<(), SessionError> {
        let url = detail_url(&self.config.base_url, &stub.detail_link);
        session.load(&url).await?;
        tokio::time::sleep(self.config.settle()).await;
        session
            .wait_for_presence(&Locator::id(GOAL_TABLE_ID), self.config.page_timeout())
            .await?;
        Ok(())
    }

    /// Activate one category panel and parse its two result tables.
    ///
    /// Returns the failure reason when the control is absent or the
    /// tables never appear within the bounded retries.
    async fn attempt_panel<S: Session>(
        &self,
        session: &mut S,
        panel: Panel,
        odds: &mut OddsSet,
    ) -> Result<(), String> {
        let locator = panel.control_locator();
        let handle = session
            .wait_for_clickable(&locator, self.config.panel_timeout())
            .await
            .map_err(|e| e.to_string())?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(control) = session.read_outer_html(handle).await {
                debug!("activating panel control {}", control.trim());
            }
        }

        session.click(handle).await.map_err(|e| e.to_string())?;
        tokio::time::sleep(self.config.settle()).await;

        let (full_id, half_id) = panel.table_ids();
        let wait = RetryConfig::table_wait(self.config.table_retries, self.config.table_backoff());
        let panel_timeout = self.config.panel_timeout();
        retry(&wait, panel.control_label(), session, |session| {
            Box::pin(async move {
                session
                    .wait_for_presence(&Locator::id(full_id), panel_timeout)
                    .await?;
                session
                    .wait_for_presence(&Locator::id(half_id), panel_timeout)
                    .await?;
                Ok::<(), SessionError>(())
            })
        })
        .await
        .map_err(|e| e.to_string())?;

        let markup = session.current_markup().await.map_err(|e| e.to_string())?;
        let (full_category, half_category) = panel.categories();
        if let Some(outcomes) = DetailParser::category_table(&markup, full_id) {
            odds.insert_category(full_category, outcomes);
        }
        if let Some(outcomes) = DetailParser::category_table(&markup, half_id) {
            odds.insert_category(half_category, outcomes);
        }
        Ok(())
    }
}
