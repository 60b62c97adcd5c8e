//! Feed configuration: a nested sport -> country -> listing URL mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Feed;

/// Parse the nested mapping into a flat feed list.
///
/// Feeds come out sorted by (sport, country), so a run always visits
/// them in the same order.
pub fn parse_feeds(json: &str) -> Result<Vec<Feed>> {
    let tree: BTreeMap<String, BTreeMap<String, String>> =
        serde_json::from_str(json).context("feed file is not a sport/country/url mapping")?;

    let mut feeds = Vec::new();
    for (sport, countries) in tree {
        for (country, url) in countries {
            feeds.push(Feed {
                sport: sport.clone(),
                country,
                url,
            });
        }
    }
    Ok(feeds)
}

/// Read and parse a feed file from disk.
pub fn load_feeds(path: &Path) -> Result<Vec<Feed>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read feed file {}", path.display()))?;
    parse_feeds(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEEDS: &str = r#"{
        "Футбол": {
            "Россия": "https://zenit.win/line/football/r_11_russia",
            "Англия": "https://zenit.win/line/football/r_37_england"
        },
        "Хоккей": {
            "США": "https://zenit.win/line/hockey/r_12_usa"
        }
    }"#;

    #[test]
    fn test_flatten_nested_mapping() {
        let feeds = parse_feeds(SAMPLE_FEEDS).unwrap();
        assert_eq!(feeds.len(), 3);

        let hockey = feeds
            .iter()
            .find(|f| f.sport == "Хоккей")
            .expect("hockey feed present");
        assert_eq!(hockey.country, "США");
        assert_eq!(hockey.url, "https://zenit.win/line/hockey/r_12_usa");
    }

    #[test]
    fn test_feed_order_deterministic() {
        let first = parse_feeds(SAMPLE_FEEDS).unwrap();
        let second = parse_feeds(SAMPLE_FEEDS).unwrap();
        let keys: Vec<(String, String)> = first
            .iter()
            .map(|f| (f.sport.clone(), f.country.clone()))
            .collect();
        let again: Vec<(String, String)> = second
            .iter()
            .map(|f| (f.sport.clone(), f.country.clone()))
            .collect();
        assert_eq!(keys, again);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(parse_feeds(r#"["not", "a", "mapping"]"#).is_err());
        assert!(parse_feeds("{").is_err());
    }
}
