//! Seam between the discovery engine and the browser-automation collaborator.
//!
//! The engine only ever holds one session at a time and drives it sequentially;
//! every method is a suspension point while the browser works.

pub mod chromium;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chromium::{BrowserOptions, ChromiumLauncher};

/// A stored browser cookie, kept in the field layout Playwright writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Seconds since the epoch; `-1` marks a session cookie.
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn session_expiry() -> f64 {
    -1.0
}

/// State of a pagination control on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Absent,
    Disabled,
    Enabled,
}

/// One rendered element handle, usually a listing card.
#[async_trait]
pub trait CardHandle: Send + Sync {
    /// Inner text of the first descendant matching `selector`, or `None` if nothing matches.
    async fn text(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute `name` of the first descendant matching `selector`.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;
}

/// A live browser context with a single page.
#[async_trait]
pub trait BrowserSession: Send {
    type Card: CardHandle;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn evaluate(&mut self, script: &str) -> Result<()>;

    /// All elements currently matching `selector`, in DOM order.
    async fn find_cards(&mut self, selector: &str) -> Result<Vec<Self::Card>>;

    /// Inner text of the first element matching `selector` anywhere on the page.
    async fn text(&mut self, selector: &str) -> Result<Option<String>>;

    async fn control_state(&mut self, selector: &str) -> Result<ControlState>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>>;

    /// Releases the browser. Called exactly once, on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// Creates fresh sessions, seeded with previously stored cookies.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, cookies: Vec<SessionCookie>) -> Result<Self::Session>;
}
