//! SQLite repository for scraped match records.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;

use super::schema::{create_day_table, table_name, ODDS_COLUMNS};
use crate::model::Match;

/// Repository appending match records to per-day tables.
pub struct MatchRepository {
    conn: Connection,
}

impl MatchRepository {
    /// Open the database, initializing it if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;

        Ok(Self { conn })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Append match records to the day table for `date`, creating the
    /// table on first use. Returns the number of rows written.
    ///
    /// A record with fewer primary odds than the canonical width stores
    /// NULL in the trailing odds columns rather than being rejected.
    pub fn insert_matches(&mut self, date: NaiveDate, matches: &[Match]) -> Result<usize> {
        let table = create_day_table(&self.conn, date)?;
        let columns = ODDS_COLUMNS.join(", ");
        let placeholders = (1..=ODDS_COLUMNS.len() + 8)
            .map(|n| format!("?{}", n))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            INSERT INTO "{}"
            (sport, country, league, time_start, date_start, team1, team2, {}, odds_json)
            VALUES ({})
            "#,
            table, columns, placeholders
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for record in matches {
                let mut values: Vec<Value> = Vec::with_capacity(ODDS_COLUMNS.len() + 8);
                values.push(record.sport.clone().into());
                values.push(record.country.clone().into());
                values.push(record.league.clone().into());
                values.push(record.kickoff_time.clone().into());
                values.push(record.kickoff_date.to_string().into());
                values.push(record.team_home.clone().into());
                values.push(record.team_away.clone().into());
                for slot in 0..ODDS_COLUMNS.len() {
                    match record.primary_odds.get(slot) {
                        Some(odd) => values.push((*odd).into()),
                        None => values.push(Value::Null),
                    }
                }
                let odds_json = serde_json::to_string(&record.odds)
                    .context("Failed to serialize category odds")?;
                values.push(odds_json.into());
                stmt.execute(rusqlite::params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(matches.len())
    }

    /// Count rows written for a run date. A missing day table counts as
    /// zero rather than an error.
    pub fn count_for_day(&self, date: NaiveDate) -> Result<i64> {
        let table = table_name(date);
        let exists: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&table],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(0);
        }

        let count: i64 = self.conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, table),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
