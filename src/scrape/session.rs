//! Rendering sessions backed by a WebDriver endpoint.
//!
//! The pipeline only ever talks to the [`Session`] trait, so navigation
//! logic can be exercised against a scripted fake. [`DriverSession`] is
//! the production implementation driving headless Chrome.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::debug;

use crate::config::WebdriverConfig;
use crate::error::SessionError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// User agents rotated across sessions so workers do not present an
/// identical fingerprint.
const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// How an element is located on the current page.
#[derive(Debug, Clone)]
pub enum Locator {
    Id(String),
    XPath(String),
}

impl Locator {
    pub fn id(value: &str) -> Self {
        Locator::Id(value.to_string())
    }

    pub fn xpath(value: String) -> Self {
        Locator::XPath(value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::XPath(xpath) => write!(f, "xpath {}", xpath),
        }
    }
}

/// Opaque reference to an element found by [`Session::wait_for_clickable`].
///
/// Handles are only valid until the next navigation of the same session.
#[derive(Debug, Clone, Copy)]
pub struct ElementHandle(pub(crate) u64);

/// One stateful rendering session. Navigation is strictly sequential:
/// a session renders one logical page at a time and must never be
/// shared between workers.
#[async_trait]
pub trait Session: Send {
    /// Navigate to a URL.
    async fn load(&mut self, url: &str) -> Result<(), SessionError>;

    /// Wait until an element is present, returning its outer markup.
    async fn wait_for_presence(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<String, SessionError>;

    /// Wait until an element is displayed and enabled.
    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, SessionError>;

    async fn click(&mut self, handle: ElementHandle) -> Result<(), SessionError>;

    async fn read_outer_html(&mut self, handle: ElementHandle) -> Result<String, SessionError>;

    /// Full markup of the currently rendered page.
    async fn current_markup(&mut self) -> Result<String, SessionError>;

    /// Tear the session down. Dropping without closing leaks a browser.
    async fn close(self) -> Result<(), SessionError>;
}

/// Creates fresh sessions, one per worker.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: Session + 'static;

    async fn create(&self) -> Result<Self::Session, SessionError>;
}

/// Production session talking to chromedriver.
pub struct DriverSession {
    driver: WebDriver,
    elements: HashMap<u64, WebElement>,
    next_handle: u64,
}

impl DriverSession {
    async fn find(&self, locator: &Locator) -> WebDriverResult<WebElement> {
        match locator {
            Locator::Id(id) => self.driver.find(By::Id(id.as_str())).await,
            Locator::XPath(xpath) => self.driver.find(By::XPath(xpath.as_str())).await,
        }
    }
}

#[async_trait]
impl Session for DriverSession {
    async fn load(&mut self, url: &str) -> Result<(), SessionError> {
        // Handles do not survive navigation.
        self.elements.clear();
        self.driver.goto(url).await.map_err(|e| SessionError::Load {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn wait_for_presence(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<String, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.find(locator).await {
                if let Ok(markup) = element.outer_html().await {
                    return Ok(markup);
                }
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: locator.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.find(locator).await {
                let displayed = element.is_displayed().await.unwrap_or(false);
                let enabled = element.is_enabled().await.unwrap_or(false);
                if displayed && enabled {
                    let handle = ElementHandle(self.next_handle);
                    self.next_handle += 1;
                    self.elements.insert(handle.0, element);
                    return Ok(handle);
                }
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    what: locator.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, handle: ElementHandle) -> Result<(), SessionError> {
        let element = self
            .elements
            .get(&handle.0)
            .ok_or_else(|| SessionError::Driver(format!("stale element handle {}", handle.0)))?;
        element
            .click()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }

    async fn read_outer_html(&mut self, handle: ElementHandle) -> Result<String, SessionError> {
        let element = self
            .elements
            .get(&handle.0)
            .ok_or_else(|| SessionError::Driver(format!("stale element handle {}", handle.0)))?;
        element
            .outer_html()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }

    async fn current_markup(&mut self) -> Result<String, SessionError> {
        self.driver
            .source()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }

    async fn close(self) -> Result<(), SessionError> {
        self.driver
            .quit()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }
}

/// Provider spawning headless Chrome sessions against a chromedriver
/// endpoint.
pub struct DriverProvider {
    config: WebdriverConfig,
}

impl DriverProvider {
    pub fn new(config: WebdriverConfig) -> Self {
        Self { config }
    }

    fn pick_user_agent() -> &'static str {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos() as usize;
        USER_AGENTS[nanos % USER_AGENTS.len()]
    }
}

#[async_trait]
impl SessionProvider for DriverProvider {
    type Session = DriverSession;

    async fn create(&self) -> Result<DriverSession, SessionError> {
        let user_agent = Self::pick_user_agent();
        debug!("starting chrome session with user agent {}", user_agent);

        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--window-size=1920,1080".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-agent={}", user_agent),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option("args", args)
            .map_err(|e| SessionError::Driver(e.to_string()))?;

        let driver = WebDriver::new(self.config.url.as_str(), caps)
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))?;

        Ok(DriverSession {
            driver,
            elements: HashMap::new(),
            next_handle: 0,
        })
    }
}
