//! Scripted session fakes for exercising navigation logic.
//!
//! [`FakeSite`] holds scripted pages keyed by URL plus a record of every
//! load, click and session close, shared across all sessions a test
//! spawns.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::SessionError;
use crate::scrape::session::{ElementHandle, Locator, Session, SessionProvider};

/// Scripted behavior of one URL.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    pub markup: String,
    /// Labels of panel controls that are present and clickable.
    pub controls: Vec<String>,
    /// Markup to switch to on each successive click, in order.
    pub on_click: Vec<String>,
    /// Ids whose presence waits fail this many times before succeeding.
    pub delayed_ids: HashMap<String, u32>,
    /// Every load of this page fails.
    pub fail_load: bool,
}

impl PageScript {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_load: true,
            ..Default::default()
        }
    }

    pub fn with_control(mut self, label: impl Into<String>) -> Self {
        self.controls.push(label.into());
        self
    }

    pub fn with_click_result(mut self, markup: impl Into<String>) -> Self {
        self.on_click.push(markup.into());
        self
    }

    pub fn with_delayed_id(mut self, id: impl Into<String>, misses: u32) -> Self {
        self.delayed_ids.insert(id.into(), misses);
        self
    }
}

#[derive(Default)]
struct SiteState {
    pages: HashMap<String, PageScript>,
    loads: Vec<String>,
    clicks: Vec<String>,
    closed_sessions: usize,
}

/// Shared scripted site, cloned into every session a test creates.
#[derive(Clone, Default)]
pub struct FakeSite {
    inner: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: impl Into<String>, script: PageScript) {
        self.inner.lock().unwrap().pages.insert(url.into(), script);
    }

    pub fn loads(&self) -> Vec<String> {
        self.inner.lock().unwrap().loads.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.inner.lock().unwrap().clicks.clone()
    }

    pub fn closed_sessions(&self) -> usize {
        self.inner.lock().unwrap().closed_sessions
    }

    fn page(&self, url: &str) -> Option<PageScript> {
        self.inner.lock().unwrap().pages.get(url).cloned()
    }

    fn record_load(&self, url: &str) {
        self.inner.lock().unwrap().loads.push(url.to_string());
    }

    fn record_click(&self, label: &str) {
        self.inner.lock().unwrap().clicks.push(label.to_string());
    }

    fn record_close(&self) {
        self.inner.lock().unwrap().closed_sessions += 1;
    }
}

/// Session whose behavior is fully scripted by a [`FakeSite`].
pub struct ScriptedSession {
    site: FakeSite,
    markup: Option<String>,
    controls: Vec<String>,
    on_click: VecDeque<String>,
    delayed_ids: HashMap<String, u32>,
    handles: HashMap<u64, String>,
    next_handle: u64,
}

impl ScriptedSession {
    pub fn new(site: &FakeSite) -> Self {
        Self {
            site: site.clone(),
            markup: None,
            controls: Vec::new(),
            on_click: VecDeque::new(),
            delayed_ids: HashMap::new(),
            handles: HashMap::new(),
            next_handle: 0,
        }
    }

    fn current(&self) -> Result<String, SessionError> {
        self.markup
            .clone()
            .ok_or_else(|| SessionError::Driver("no page loaded".to_string()))
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn load(&mut self, url: &str) -> Result<(), SessionError> {
        self.site.record_load(url);
        self.handles.clear();

        let script = self.site.page(url).ok_or_else(|| SessionError::Load {
            url: url.to_string(),
            reason: "no scripted page".to_string(),
        })?;
        if script.fail_load {
            return Err(SessionError::Load {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        self.markup = Some(script.markup);
        self.controls = script.controls;
        self.on_click = script.on_click.into();
        self.delayed_ids = script.delayed_ids;
        Ok(())
    }

    async fn wait_for_presence(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<String, SessionError> {
        let Locator::Id(id) = locator else {
            return Err(SessionError::Driver(
                "presence waits are scripted by id only".to_string(),
            ));
        };

        if let Some(remaining) = self.delayed_ids.get_mut(id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SessionError::Timeout {
                    what: locator.to_string(),
                    timeout,
                });
            }
        }

        let markup = self.current()?;
        match element_outer_html(&markup, id) {
            Some(outer) => Ok(outer),
            None => Err(SessionError::Timeout {
                what: locator.to_string(),
                timeout,
            }),
        }
    }

    async fn wait_for_clickable(
        &mut self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, SessionError> {
        let Locator::XPath(xpath) = locator else {
            return Err(SessionError::Driver(
                "clickable waits are scripted by xpath only".to_string(),
            ));
        };

        let label = xpath_label(xpath).unwrap_or_default();
        if !self.controls.iter().any(|c| c.as_str() == label) {
            return Err(SessionError::Timeout {
                what: locator.to_string(),
                timeout,
            });
        }

        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle.0, label.to_string());
        Ok(handle)
    }

    async fn click(&mut self, handle: ElementHandle) -> Result<(), SessionError> {
        let label = self
            .handles
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| SessionError::Driver(format!("stale element handle {}", handle.0)))?;
        self.site.record_click(&label);
        if let Some(next_markup) = self.on_click.pop_front() {
            self.markup = Some(next_markup);
        }
        Ok(())
    }

    async fn read_outer_html(&mut self, handle: ElementHandle) -> Result<String, SessionError> {
        let label = self
            .handles
            .get(&handle.0)
            .ok_or_else(|| SessionError::Driver(format!("stale element handle {}", handle.0)))?;
        Ok(format!(
            "<div class=\"line-base-filter-item\">{}</div>",
            label
        ))
    }

    async fn current_markup(&mut self) -> Result<String, SessionError> {
        self.current()
    }

    async fn close(self) -> Result<(), SessionError> {
        self.site.record_close();
        Ok(())
    }
}

/// Provider handing out scripted sessions against a shared site.
pub struct ScriptedProvider {
    site: FakeSite,
    fail_create: bool,
}

impl ScriptedProvider {
    pub fn new(site: &FakeSite) -> Self {
        Self {
            site: site.clone(),
            fail_create: false,
        }
    }

    /// Provider that cannot create any session at all.
    pub fn failing(site: &FakeSite) -> Self {
        Self {
            site: site.clone(),
            fail_create: true,
        }
    }
}

#[async_trait]
impl SessionProvider for ScriptedProvider {
    type Session = ScriptedSession;

    async fn create(&self) -> Result<ScriptedSession, SessionError> {
        if self.fail_create {
            return Err(SessionError::Driver("no webdriver available".to_string()));
        }
        Ok(ScriptedSession::new(&self.site))
    }
}

fn xpath_label(xpath: &str) -> Option<&str> {
    let start = xpath.find("text()='")? + "text()='".len();
    let rest = &xpath[start..];
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

/// Outer markup of the element carrying `id`, matching what a driver's
/// presence wait hands back.
fn element_outer_html(markup: &str, id: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("[id]").unwrap();
    document
        .select(&selector)
        .find(|el| el.value().id() == Some(id))
        .map(|el| el.html())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_label_extraction() {
        let xpath = "//div[contains(@class, 'line-base-filter-item') and text()='Угловые']";
        assert_eq!(xpath_label(xpath), Some("Угловые"));
        assert_eq!(xpath_label("//div[@id='x']"), None);
    }

    #[tokio::test]
    async fn test_presence_wait_returns_element_subtree_only() {
        let site = FakeSite::new();
        site.add_page(
            "u",
            PageScript::new(
                "<div id=\"keep\"><p>inside</p></div><div id=\"other\"><p>outside</p></div>",
            ),
        );
        let mut session = ScriptedSession::new(&site);
        session.load("u").await.unwrap();

        let snapshot = session
            .wait_for_presence(&Locator::id("keep"), Duration::from_millis(1))
            .await
            .unwrap();
        assert!(snapshot.contains("<p>inside</p>"));
        assert!(!snapshot.contains("outside"));

        let missing = session
            .wait_for_presence(&Locator::id("absent"), Duration::from_millis(1))
            .await;
        assert!(matches!(missing, Err(SessionError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_delayed_id_counts_down() {
        let site = FakeSite::new();
        site.add_page(
            "u",
            PageScript::new("<div id=\"t\"></div>").with_delayed_id("t", 2),
        );
        let mut session = ScriptedSession::new(&site);
        session.load("u").await.unwrap();

        let locator = Locator::id("t");
        let timeout = Duration::from_millis(1);
        assert!(session.wait_for_presence(&locator, timeout).await.is_err());
        assert!(session.wait_for_presence(&locator, timeout).await.is_err());
        assert!(session.wait_for_presence(&locator, timeout).await.is_ok());
    }

    #[tokio::test]
    async fn test_click_switches_markup_and_is_recorded() {
        let site = FakeSite::new();
        site.add_page(
            "u",
            PageScript::new("first")
                .with_control("Угловые")
                .with_click_result("second"),
        );
        let mut session = ScriptedSession::new(&site);
        session.load("u").await.unwrap();

        let locator = Locator::xpath(
            "//div[contains(@class, 'line-base-filter-item') and text()='Угловые']".to_string(),
        );
        let handle = session
            .wait_for_clickable(&locator, Duration::from_millis(1))
            .await
            .unwrap();
        let control = session.read_outer_html(handle).await.unwrap();
        assert!(control.contains("Угловые"));

        session.click(handle).await.unwrap();
        assert_eq!(session.current_markup().await.unwrap(), "second");
        assert_eq!(site.clicks(), vec!["Угловые".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_page_fails_load() {
        let site = FakeSite::new();
        site.add_page("down", PageScript::unreachable());
        let mut session = ScriptedSession::new(&site);

        let result = session.load("down").await;
        assert!(matches!(result, Err(SessionError::Load { .. })));
        assert_eq!(site.loads(), vec!["down".to_string()]);
    }
}
