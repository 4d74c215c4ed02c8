//! Scripted in-memory browser used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use job_monitor_lib::{
    BrowserLauncher, BrowserSession, CardHandle, ControlState, MonitorConfig, MonitorError,
    PacingConfig, Result, Selectors, SessionCookie,
};

#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    texts: HashMap<String, String>,
    link: Option<String>,
    broken: bool,
}

impl FakeCard {
    pub fn job(title: &str, company: &str, location: &str) -> Self {
        let sel = Selectors::default();
        let mut texts = HashMap::new();
        texts.insert(sel.title, title.to_string());
        texts.insert(sel.company, company.to_string());
        texts.insert(sel.location, location.to_string());
        FakeCard {
            texts,
            link: Some(format!("/jobs/view/{}-{}", title.replace(' ', "-").to_lowercase(), company.to_lowercase())),
            broken: false,
        }
    }

    /// A card the UI has not filled in yet.
    pub fn placeholder() -> Self {
        FakeCard::default()
    }

    /// A card whose handle went stale.
    pub fn detached() -> Self {
        FakeCard { broken: true, ..FakeCard::default() }
    }
}

#[async_trait]
impl CardHandle for FakeCard {
    async fn text(&self, selector: &str) -> Result<Option<String>> {
        if self.broken {
            return Err(MonitorError::Browser("node is detached from document".into()));
        }
        Ok(self.texts.get(selector).cloned())
    }

    async fn attribute(&self, _selector: &str, _name: &str) -> Result<Option<String>> {
        if self.broken {
            return Err(MonitorError::Browser("node is detached from document".into()));
        }
        Ok(self.link.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub cards: Vec<FakeCard>,
    pub total_text: Option<String>,
    pub next: ControlState,
    pub fail_cards: bool,
}

impl FakePage {
    pub fn with_cards(cards: Vec<FakeCard>) -> Self {
        FakePage {
            cards,
            total_text: None,
            next: ControlState::Absent,
            fail_cards: false,
        }
    }

    pub fn jobs(titles: &[&str]) -> Self {
        FakePage::with_cards(titles.iter().map(|t| FakeCard::job(t, "Acme", "Delhi")).collect())
    }

    pub fn total(mut self, text: &str) -> Self {
        self.total_text = Some(text.to_string());
        self
    }

    pub fn next(mut self, state: ControlState) -> Self {
        self.next = state;
        self
    }

    pub fn broken() -> Self {
        FakePage { fail_cards: true, ..FakePage::with_cards(Vec::new()) }
    }
}

#[derive(Default)]
pub struct SiteState {
    /// URL -> pages reachable from it by clicking "next".
    pub routes: HashMap<String, Vec<FakePage>>,
    pub failing_urls: HashSet<String>,
    pub fail_click: bool,
    pub fail_launch: bool,
    pub browser_cookies: Vec<SessionCookie>,

    pub launched_with: Vec<Vec<SessionCookie>>,
    pub navigations: Vec<String>,
    pub clicks: usize,
    pub card_queries: usize,
    pub closes: usize,
}

#[derive(Clone, Default)]
pub struct FakeSite {
    pub state: Arc<Mutex<SiteState>>,
}

impl FakeSite {
    pub fn new() -> Self {
        FakeSite::default()
    }

    pub fn route(&self, url: &str, pages: Vec<FakePage>) -> &Self {
        self.state.lock().unwrap().routes.insert(url.to_string(), pages);
        self
    }

    pub fn fail_navigation(&self, url: &str) -> &Self {
        self.state.lock().unwrap().failing_urls.insert(url.to_string());
        self
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SiteState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn launcher(&self) -> FakeLauncher {
        FakeLauncher { site: self.clone() }
    }
}

pub struct FakeLauncher {
    pub site: FakeSite,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, cookies: Vec<SessionCookie>) -> Result<FakeSession> {
        let mut state = self.site.state.lock().unwrap();
        if state.fail_launch {
            return Err(MonitorError::Browser("chrome executable not found".into()));
        }
        state.launched_with.push(cookies);
        Ok(FakeSession {
            site: self.site.clone(),
            current: None,
        })
    }
}

pub struct FakeSession {
    site: FakeSite,
    current: Option<(String, usize)>,
}

impl FakeSession {
    fn page(&self) -> Option<FakePage> {
        let (url, index) = self.current.as_ref()?;
        let state = self.site.state.lock().unwrap();
        state.routes.get(url).and_then(|pages| pages.get(*index)).cloned()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Card = FakeCard;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let mut state = self.site.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if state.failing_urls.contains(url) {
            return Err(MonitorError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_TIMED_OUT".into(),
            });
        }
        self.current = Some((url.to_string(), 0));
        Ok(())
    }

    async fn evaluate(&mut self, _script: &str) -> Result<()> {
        Ok(())
    }

    async fn find_cards(&mut self, _selector: &str) -> Result<Vec<FakeCard>> {
        self.site.state.lock().unwrap().card_queries += 1;
        match self.page() {
            Some(page) if page.fail_cards => Err(MonitorError::Browser("execution context was destroyed".into())),
            Some(page) => Ok(page.cards),
            None => Ok(Vec::new()),
        }
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>> {
        if Some(selector) != Selectors::default().result_count.as_deref() {
            return Ok(None);
        }
        Ok(self.page().and_then(|p| p.total_text))
    }

    async fn control_state(&mut self, _selector: &str) -> Result<ControlState> {
        Ok(self.page().map_or(ControlState::Absent, |p| p.next))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let mut state = self.site.state.lock().unwrap();
        state.clicks += 1;
        if state.fail_click {
            return Err(MonitorError::Browser(format!("element {} is not clickable", selector)));
        }
        if let Some((_, index)) = self.current.as_mut() {
            *index += 1;
        }
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>> {
        Ok(self.site.state.lock().unwrap().browser_cookies.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.site.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub fn cookie(name: &str, value: &str) -> SessionCookie {
    SessionCookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: ".linkedin.com".to_string(),
        path: "/".to_string(),
        expires: -1.0,
        http_only: true,
        secure: true,
        same_site: None,
    }
}

pub fn test_config(dir: &Path) -> MonitorConfig {
    MonitorConfig {
        pacing: PacingConfig::immediate(),
        session_path: dir.join("cookies.json"),
        output_path: dir.join("jobs.csv"),
        ..MonitorConfig::default()
    }
}
