//! Configuration for the betline scraper.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scrape pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Number of parallel workers, one rendering session each
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Listing/detail page readiness wait
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
    /// Wait for a category control to become clickable
    #[serde(default = "default_panel_timeout_secs")]
    pub panel_timeout_secs: u64,
    /// Retries while waiting for a panel's result tables
    #[serde(default = "default_table_retries")]
    pub table_retries: u32,
    #[serde(default = "default_table_backoff_ms")]
    pub table_backoff_ms: u64,
    /// Settle delay after navigation or a panel click
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_feeds_file")]
    pub feeds_file: String,
}

fn default_base_url() -> String {
    "https://zenit.win".to_string()
}

fn default_concurrency() -> usize {
    3
}

fn default_page_timeout_secs() -> u64 {
    50
}

fn default_panel_timeout_secs() -> u64 {
    10
}

fn default_table_retries() -> u32 {
    3
}

fn default_table_backoff_ms() -> u64 {
    500
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_feeds_file() -> String {
    "urls/zenit_urls.json".to_string()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency: default_concurrency(),
            page_timeout_secs: default_page_timeout_secs(),
            panel_timeout_secs: default_panel_timeout_secs(),
            table_retries: default_table_retries(),
            table_backoff_ms: default_table_backoff_ms(),
            settle_ms: default_settle_ms(),
            feeds_file: default_feeds_file(),
        }
    }
}

impl ScrapeConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn panel_timeout(&self) -> Duration {
        Duration::from_secs(self.panel_timeout_secs)
    }

    pub fn table_backoff(&self) -> Duration {
        Duration::from_millis(self.table_backoff_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// WebDriver endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebdriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_headless() -> bool {
    true
}

impl Default for WebdriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "data_bet.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub webdriver: WebdriverConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (BETLINE_SCRAPE_CONCURRENCY, etc.)
            .add_source(
                config::Environment::with_prefix("BETLINE")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
