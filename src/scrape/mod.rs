//! Scraping pipeline: rendered listing pages into match records.
//!
//! The flow is listing first, detail second. A session renders a feed's
//! listing page, [`listing::ListingParser`] keeps the same-day rows, and
//! [`navigator::Navigator`] walks each match's detail view for the
//! optional odds categories. [`runner::run`] drives the whole thing over
//! a bounded worker pool.

pub mod detail;
pub mod listing;
pub mod navigator;
pub mod runner;
pub mod session;
#[cfg(test)]
pub mod testing;

pub use runner::run;
pub use session::DriverProvider;

/// Join a listing row's relative detail link onto the site base URL.
pub fn detail_url(base_url: &str, link: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_url_joins_relative_link() {
        assert_eq!(
            detail_url("https://zenit.win", "/line-match/1001"),
            "https://zenit.win/line-match/1001"
        );
        assert_eq!(
            detail_url("https://zenit.win/", "/line-match/1001"),
            "https://zenit.win/line-match/1001"
        );
    }
}
