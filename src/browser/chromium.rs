//! Chrome DevTools Protocol implementation of the browser seam.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam, CookieSameSite, TimeSinceEpoch};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, warn};
use rand::seq::SliceRandom;
use tokio::task::JoinHandle;

use super::{BrowserLauncher, BrowserSession, CardHandle, ControlState, SessionCookie};
use crate::error::{MonitorError, Result};

const DEFAULT_USER_AGENTS: [&str; 2] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
];

impl From<CdpError> for MonitorError {
    fn from(err: CdpError) -> Self {
        MonitorError::Browser(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agents: Vec<String>,
    pub window: (u32, u32),
    pub accept_language: String,
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        BrowserOptions {
            headless: false,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            window: (1920, 1080),
            accept_language: "en-US,en;q=0.9".to_string(),
            extra_args: vec![
                "--disable-blink-features=AutomationControlled".to_string(),
                "--no-sandbox".to_string(),
            ],
        }
    }
}

pub struct ChromiumLauncher {
    options: BrowserOptions,
}

impl ChromiumLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        ChromiumLauncher { options }
    }

    fn random_user_agent(&self) -> Option<&str> {
        let mut rng = rand::thread_rng();
        self.options.user_agents.choose(&mut rng).map(String::as_str)
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let (width, height) = self.options.window;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .arg(format!("--accept-lang={}", self.options.accept_language));
        for arg in &self.options.extra_args {
            builder = builder.arg(arg.as_str());
        }
        if !self.options.headless {
            builder = builder.with_head();
        }
        builder.build().map_err(MonitorError::Browser)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, cookies: Vec<SessionCookie>) -> Result<ChromiumSession> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
        };
        // From here on the session owns the process, so close it if setup fails.
        if let Err(e) = session.prepare_page(self.random_user_agent(), cookies).await {
            if let Err(close_err) = session.close().await {
                warn!("Failed to close browser after setup error: {}", close_err);
            }
            return Err(e);
        }
        Ok(session)
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    async fn prepare_page(&mut self, user_agent: Option<&str>, cookies: Vec<SessionCookie>) -> Result<()> {
        let page = self.browser.new_page("about:blank").await?;
        if let Some(ua) = user_agent {
            page.set_user_agent(ua).await?;
        }
        if !cookies.is_empty() {
            let params: Vec<CookieParam> = cookies.iter().map(to_cookie_param).collect();
            page.set_cookies(params).await?;
            debug!("Loaded {} stored cookies", cookies.len());
        }
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| MonitorError::Browser("browser page is not open".to_string()))
    }

    async fn first(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.page()?.find_elements(selector).await?.into_iter().next())
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Card = ChromiumCard;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| MonitorError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<()> {
        let wrapped = format!("(() => {{ {} }})()", script);
        self.page()?.evaluate(wrapped).await?;
        Ok(())
    }

    async fn find_cards(&mut self, selector: &str) -> Result<Vec<ChromiumCard>> {
        let elements = self.page()?.find_elements(selector).await?;
        Ok(elements.into_iter().map(|element| ChromiumCard { element }).collect())
    }

    async fn text(&mut self, selector: &str) -> Result<Option<String>> {
        match self.first(selector).await? {
            Some(element) => Ok(element.inner_text().await?),
            None => Ok(None),
        }
    }

    async fn control_state(&mut self, selector: &str) -> Result<ControlState> {
        let Some(element) = self.first(selector).await? else {
            return Ok(ControlState::Absent);
        };
        let disabled = element.attribute("disabled").await?.is_some()
            || element.attribute("aria-disabled").await?.as_deref() == Some("true");
        Ok(if disabled { ControlState::Disabled } else { ControlState::Enabled })
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let page = self.page()?;
        let element = page.find_element(selector).await?;
        element.scroll_into_view().await?;
        element.click().await?;
        Ok(())
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>> {
        let cookies = self.page()?.get_cookies().await?;
        Ok(cookies.into_iter().map(from_cookie).collect())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Page close failed: {}", e);
            }
        }
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}

pub struct ChromiumCard {
    element: Element,
}

impl ChromiumCard {
    async fn child(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.element.find_elements(selector).await?.into_iter().next())
    }
}

#[async_trait]
impl CardHandle for ChromiumCard {
    async fn text(&self, selector: &str) -> Result<Option<String>> {
        match self.child(selector).await? {
            Some(element) => Ok(element.inner_text().await?),
            None => Ok(None),
        }
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        match self.child(selector).await? {
            Some(element) => Ok(element.attribute(name).await?),
            None => Ok(None),
        }
    }
}

fn to_cookie_param(cookie: &SessionCookie) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    if !cookie.domain.is_empty() {
        param.domain = Some(cookie.domain.clone());
    }
    param.path = Some(cookie.path.clone());
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    if cookie.expires >= 0.0 {
        param.expires = Some(TimeSinceEpoch::new(cookie.expires));
    }
    param.same_site = match cookie.same_site.as_deref() {
        Some("Strict") => Some(CookieSameSite::Strict),
        Some("Lax") => Some(CookieSameSite::Lax),
        Some("None") => Some(CookieSameSite::None),
        _ => None,
    };
    param
}

fn from_cookie(cookie: Cookie) -> SessionCookie {
    #[allow(unreachable_patterns)]
    let same_site = cookie.same_site.and_then(|s| match s {
        CookieSameSite::Strict => Some("Strict"),
        CookieSameSite::Lax => Some("Lax"),
        CookieSameSite::None => Some("None"),
        _ => None,
    });
    SessionCookie {
        name: cookie.name,
        value: cookie.value,
        domain: cookie.domain,
        path: cookie.path,
        expires: if cookie.session { -1.0 } else { cookie.expires },
        http_only: cookie.http_only,
        secure: cookie.secure,
        same_site: same_site.map(str::to_string),
    }
}
