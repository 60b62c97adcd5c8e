//! SQLite storage for scraped match records.
//!
//! One database file accumulates one table per run date; every run
//! appends that day's records to its own table.

pub mod repository;
pub mod schema;

pub use repository::MatchRepository;
