//! SQLite schema for per-day odds snapshots.
//!
//! Each run writes into a table named after the run date (`YYYYMMDD`),
//! so one database file accumulates one table per scraped day. A day
//! table carries the match identity columns, the eleven primary odds
//! columns in listing order, and the category odds as a JSON document.

use chrono::NaiveDate;
use rusqlite::{Connection, Result};

use crate::normalize::CANONICAL_ODDS_LEN;

/// Primary odds columns, in listing order.
pub const ODDS_COLUMNS: [&str; CANONICAL_ODDS_LEN] = [
    "w1", "x", "w2", "h1", "hv1", "h2", "hv2", "m", "t", "b", "extra",
];

/// Table name for one run date, e.g. `20260603`.
pub fn table_name(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Create the day table for `date` if it does not exist yet.
///
/// Returns the table name. Day tables start with a digit, so every
/// statement touching one must quote it.
pub fn create_day_table(conn: &Connection, date: NaiveDate) -> Result<String> {
    let table = table_name(date);
    let odds_columns = ODDS_COLUMNS
        .iter()
        .map(|col| format!("{} REAL", col))
        .collect::<Vec<_>>()
        .join(",\n            ");
    conn.execute(
        &format!(
            r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sport TEXT NOT NULL,
            country TEXT NOT NULL,
            league TEXT NOT NULL,
            time_start TEXT NOT NULL,
            date_start TEXT NOT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            {odds_columns},
            odds_json TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#
        ),
        [],
    )?;
    Ok(table)
}
