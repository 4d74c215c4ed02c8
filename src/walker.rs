//! Walks one search query's result pages and collects complete records.

use log::{debug, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession, ControlState};
use crate::config::{MonitorConfig, PacingConfig, PaginationConfig, PaginationMode, Selectors};
use crate::delay_manager;
use crate::error::{MonitorError, Result};
use crate::extractor::{Extraction, Extractor};
use crate::record::JobRecord;
use crate::search_query::SearchQuery;
use crate::session_store::SessionStore;

type CardOf<L> = <<L as BrowserLauncher>::Session as BrowserSession>::Card;

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    NoCards,
    NoNextPage,
    TotalReached,
    PageLimit,
    AdvanceFailed,
}

#[derive(Debug)]
pub struct WalkOutcome {
    pub records: Vec<JobRecord>,
    pub pages: usize,
    pub stop: StopReason,
}

pub struct PageWalker<L: BrowserLauncher> {
    launcher: L,
    extractor: Extractor,
    session_store: SessionStore,
    pacing: PacingConfig,
    pagination: PaginationConfig,
    selectors: Selectors,
}

impl<L: BrowserLauncher> PageWalker<L> {
    pub fn new(launcher: L, config: &MonitorConfig) -> Self {
        PageWalker {
            launcher,
            extractor: Extractor::new(config.selectors.clone()),
            session_store: SessionStore::new(config.session_path.clone()),
            pacing: config.pacing.clone(),
            pagination: config.pagination.clone(),
            selectors: config.selectors.clone(),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Collects up to `target` records for `query`.
    ///
    /// A fresh browser session is opened with the stored cookies and is always
    /// closed again, with its cookies written back, whether or not the walk
    /// succeeds. Only a failure to open the session or load the first page is
    /// returned as an error; trouble on later pages ends the walk early.
    pub async fn walk(&self, query: &SearchQuery, target: usize) -> Result<WalkOutcome> {
        let cookies = self.session_store.load();
        let mut session = self.launcher.launch(cookies).await?;
        let outcome = self.walk_pages(&mut session, query, target).await;
        self.release(&mut session).await;
        outcome
    }

    async fn release(&self, session: &mut L::Session) {
        match session.cookies().await {
            Ok(cookies) => {
                if let Err(e) = self.session_store.save(&cookies) {
                    warn!("Failed to save session cookies: {}", e);
                }
            }
            Err(e) => warn!("Failed to read session cookies: {}", e),
        }
        if let Err(e) = session.close().await {
            warn!("Failed to close browser: {}", e);
        }
    }

    async fn walk_pages(&self, session: &mut L::Session, query: &SearchQuery, target: usize) -> Result<WalkOutcome> {
        let mut records = Vec::new();
        if target == 0 {
            return Ok(WalkOutcome { records, pages: 0, stop: StopReason::TargetReached });
        }

        let mut page = 0;
        let first_url = query.page_url(0, self.pagination.page_size, &self.pagination.offset_param);
        self.load(session, &first_url).await?;
        let mut cards = self.reveal(session).await?;

        let stop = loop {
            info!("Found {} job cards on page {}", cards.len(), page + 1);
            if cards.is_empty() {
                break StopReason::NoCards;
            }

            for card in &cards {
                if records.len() >= target {
                    break;
                }
                if let Extraction::Record(record) = self.extractor.extract(card).await {
                    records.push(record);
                }
            }

            if records.len() >= target {
                break StopReason::TargetReached;
            }
            if let Some(reason) = self.exhausted(session, page).await {
                break reason;
            }
            if page + 1 >= self.pagination.max_pages {
                info!("Reached the page limit of {} for this search", self.pagination.max_pages);
                break StopReason::PageLimit;
            }

            match self.next_page(session, query, page + 1).await {
                Ok(next) => {
                    cards = next;
                    page += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    break StopReason::AdvanceFailed;
                }
            }
        };

        debug!("Walk of {} stopped after {} pages: {:?}", query.label, page + 1, stop);
        Ok(WalkOutcome { records, pages: page + 1, stop })
    }

    async fn load(&self, session: &mut L::Session, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        session.navigate(url).await?;
        delay_manager::random_pause(self.pacing.settle, "page settle").await;
        Ok(())
    }

    /// Gives the lazily rendered list a bounded number of chances to fill in,
    /// then returns whatever cards are present.
    async fn reveal(&self, session: &mut L::Session) -> Result<Vec<CardOf<L>>> {
        if let Some(container) = &self.selectors.results_container {
            let script = format!(
                "const c = document.querySelector({}); if (c) {{ c.scrollIntoView({{ behavior: 'smooth', block: 'end' }}); }}",
                serde_json::to_string(container)?
            );
            if let Err(e) = session.evaluate(&script).await {
                debug!("Scrolling the results container failed: {}", e);
            }
        }

        let mut cards = Vec::new();
        for _ in 0..self.pacing.reveal_polls {
            delay_manager::pause(self.pacing.reveal_poll_interval, "reveal poll").await;
            cards = session.find_cards(&self.selectors.card).await?;
            if cards.len() >= self.pacing.card_threshold {
                break;
            }
        }
        Ok(cards)
    }

    /// Checks the termination signals available after `page` (zero-based) was read.
    async fn exhausted(&self, session: &mut L::Session, page: usize) -> Option<StopReason> {
        if let Some(next) = &self.selectors.next_control {
            let state = session.control_state(next).await;
            match (self.pagination.mode, state) {
                (_, Ok(ControlState::Enabled)) => {}
                (_, Ok(state @ ControlState::Disabled)) | (PaginationMode::NextControl, Ok(state @ ControlState::Absent)) => {
                    info!("Next page control is {:?}; no more pages", state);
                    return Some(StopReason::NoNextPage);
                }
                // Offset pages stay reachable by URL when the control is not rendered.
                (PaginationMode::Offset, Ok(ControlState::Absent)) => {}
                (PaginationMode::NextControl, Err(e)) => {
                    warn!("Could not inspect next page control: {}", e);
                    return Some(StopReason::AdvanceFailed);
                }
                (PaginationMode::Offset, Err(e)) => {
                    debug!("Next page control unavailable: {}", e);
                }
            }
        }

        let count_selector = self.selectors.result_count.as_ref()?;
        let text = match session.text(count_selector).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                debug!("Result count unavailable: {}", e);
                return None;
            }
        };
        let total = parse_result_total(&text)?;
        let seen = (page + 1) * self.pagination.page_size;
        if seen >= total {
            info!("Covered {} of {} reported results", seen.min(total), total);
            return Some(StopReason::TotalReached);
        }
        None
    }

    async fn next_page(&self, session: &mut L::Session, query: &SearchQuery, index: usize) -> Result<Vec<CardOf<L>>> {
        let advance_err = |e: MonitorError| MonitorError::PageAdvance {
            page: index + 1,
            reason: e.to_string(),
        };

        match self.pagination.mode {
            PaginationMode::Offset => {
                let url = query.page_url(index, self.pagination.page_size, &self.pagination.offset_param);
                self.load(session, &url).await.map_err(advance_err)?;
            }
            PaginationMode::NextControl => {
                let next = self
                    .selectors
                    .next_control
                    .as_deref()
                    .ok_or_else(|| advance_err(MonitorError::Config("no next control selector".into())))?;
                info!("Clicking through to page {}", index + 1);
                session.click(next).await.map_err(advance_err)?;
                delay_manager::random_pause(self.pacing.settle, "page settle").await;
            }
        }
        self.reveal(session).await.map_err(advance_err)
    }
}

/// Reads the total from a result-count banner such as "1,234 results".
/// Ranges such as "1 - 25 of 300 results" report the largest number as the total.
pub fn parse_result_total(text: &str) -> Option<usize> {
    text.split_whitespace()
        .map(|token| token.trim_end_matches('+').replace(',', ""))
        .filter_map(|token| token.parse::<usize>().ok())
        .max()
}
