//! Detail page table parsers.
//!
//! A detail page renders the initial "will score a goal" table on load
//! and one or two further tables per category panel once its control
//! has been clicked. Tables are looked up by container id in the full
//! page markup; an absent container means the category is not offered.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use crate::model::OddsValues;
use crate::normalize::{canonical_name, to_float};

/// Container id of the initial odds table every detail page renders.
pub const GOAL_TABLE_ID: &str = "table_1031";

/// Parser for the odds tables on a match detail page.
pub struct DetailParser;

impl DetailParser {
    /// Parse the fixed-shape goal table: one row per outcome with
    /// (name, yes-odds, no-odds) cells.
    pub fn goal_table(markup: &str) -> Option<BTreeMap<String, OddsValues>> {
        let document = Html::parse_document(markup);
        let container = find_container(&document, GOAL_TABLE_ID)?;
        let row_selector = Selector::parse("tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        let mut outcomes = BTreeMap::new();
        for row in container.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() < 3 {
                continue;
            }
            outcomes.insert(
                canonical_name(&cells[0]),
                OddsValues::Pair([to_float(&cells[1]), to_float(&cells[2])]),
            );
        }
        Some(outcomes)
    }

    /// Parse a grouped category table.
    ///
    /// A row with exactly 4 cells is a group header; its first cell
    /// names the outcome for itself and all following rows until the
    /// next header. Every row contributes its last 3 cells as one odds
    /// triple, so within a group the last row wins. Rows before the
    /// first header carry no outcome name and are skipped.
    pub fn category_table(markup: &str, table_id: &str) -> Option<BTreeMap<String, OddsValues>> {
        let document = Html::parse_document(markup);
        let container = find_container(&document, table_id)?;
        let row_selector = Selector::parse("tr").unwrap();
        let cell_selector = Selector::parse("td").unwrap();

        let mut outcomes = BTreeMap::new();
        let mut active_name: Option<String> = None;
        for row in container.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|c| c.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() == 4 {
                active_name = Some(canonical_name(&cells[0]));
            }
            let Some(name) = active_name.clone() else {
                continue;
            };
            if cells.len() < 3 {
                continue;
            }
            let triple = [
                to_float(&cells[cells.len() - 3]),
                to_float(&cells[cells.len() - 2]),
                to_float(&cells[cells.len() - 1]),
            ];
            outcomes.insert(name, OddsValues::Triple(triple));
        }
        Some(outcomes)
    }
}

fn find_container<'a>(document: &'a Html, table_id: &str) -> Option<ElementRef<'a>> {
    let container_selector = Selector::parse("div[id]").unwrap();
    document
        .select(&container_selector)
        .find(|el| el.value().id() == Some(table_id))
}
