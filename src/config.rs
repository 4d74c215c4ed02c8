//! Tunables for the discovery engine and the command-line surface that fills them in.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::browser::BrowserOptions;
use crate::delay_manager::DelayRange;
use crate::error::{MonitorError, Result};

pub const DEFAULT_SESSION_PATH: &str = "linkedin_cookies.json";
pub const DEFAULT_OUTPUT_PATH: &str = "internships.csv";
pub const DEFAULT_LOGIN_URL: &str = "https://www.linkedin.com/login";

/// Waits that give the asynchronously rendered UI time to settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after every navigation before looking for cards.
    pub settle: DelayRange,
    /// Maximum number of card re-queries while the lazy list fills in.
    pub reveal_polls: u32,
    pub reveal_poll_interval: Duration,
    /// Card count that ends the reveal polling early.
    pub card_threshold: usize,
    pub inter_query: DelayRange,
    pub cycle_interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            settle: DelayRange::from_secs(3, 5),
            reveal_polls: 10,
            reveal_poll_interval: Duration::from_secs(1),
            card_threshold: 25,
            inter_query: DelayRange::from_secs(5, 10),
            cycle_interval: Duration::from_secs(300),
        }
    }
}

impl PacingConfig {
    /// No waiting at all; used by tests and dry runs.
    pub fn immediate() -> Self {
        PacingConfig {
            settle: DelayRange::zero(),
            reveal_polls: 1,
            reveal_poll_interval: Duration::ZERO,
            card_threshold: 25,
            inter_query: DelayRange::zero(),
            cycle_interval: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaginationMode {
    /// Re-navigate with an offset query parameter.
    Offset,
    /// Click the site's "next page" control.
    NextControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub mode: PaginationMode,
    pub page_size: usize,
    pub offset_param: String,
    /// Hard stop regardless of what the page reports.
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            mode: PaginationMode::Offset,
            page_size: 25,
            offset_param: "start".to_string(),
            max_pages: 40,
        }
    }
}

/// CSS paths into the search-results UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub card: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub link_attribute: String,
    /// Scrolled into view to wake the virtualized list; `None` skips the scroll.
    pub results_container: Option<String>,
    pub result_count: Option<String>,
    pub next_control: Option<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            card: "div.job-card-container.relative.job-card-list".to_string(),
            title: ".job-card-list__title--link span strong".to_string(),
            company: ".artdeco-entity-lockup__subtitle span".to_string(),
            location: ".job-card-container__metadata-wrapper li span".to_string(),
            link: ".job-card-list__title--link".to_string(),
            link_attribute: "href".to_string(),
            results_container: Some("ul.ffbbjNmknqAXhulEufUCQfHWdANElJtnLXXALA".to_string()),
            result_count: Some(".jobs-search-results-list__subtitle".to_string()),
            next_control: Some("button.jobs-search-pagination__button--next".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub pacing: PacingConfig,
    pub pagination: PaginationConfig,
    pub selectors: Selectors,
    /// Records requested from each walk.
    pub target_count: usize,
    /// `None` keeps monitoring until the process is killed.
    pub max_cycles: Option<u64>,
    pub session_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            pacing: PacingConfig::default(),
            pagination: PaginationConfig::default(),
            selectors: Selectors::default(),
            target_count: 100,
            max_cycles: None,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_size == 0 {
            return Err(MonitorError::Config("page size must be at least 1".into()));
        }
        if self.pagination.max_pages == 0 {
            return Err(MonitorError::Config("max pages must be at least 1".into()));
        }
        if self.pacing.reveal_polls == 0 {
            return Err(MonitorError::Config("reveal polls must be at least 1".into()));
        }
        if self.pagination.mode == PaginationMode::NextControl && self.selectors.next_control.is_none() {
            return Err(MonitorError::Config("next-control pagination needs a next control selector".into()));
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "job-monitor", version, about = "Watches job searches and appends new postings to a CSV log")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub settings: Settings,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the monitoring loop (default)
    Watch,
    /// Open a browser window for a manual login and store the session cookies
    Login {
        #[arg(long, env = "JOB_MONITOR_LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
        url: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct Settings {
    /// Search URL to watch; repeat for several
    #[arg(long = "query", env = "JOB_MONITOR_QUERIES", value_delimiter = ',')]
    pub queries: Vec<String>,

    /// CSV or XLSX file listing search URLs or keywords
    #[arg(long, env = "JOB_MONITOR_QUERIES_FILE")]
    pub queries_file: Option<PathBuf>,

    #[arg(long, env = "JOB_MONITOR_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    #[arg(long, env = "JOB_MONITOR_SESSION", default_value = DEFAULT_SESSION_PATH)]
    pub session: PathBuf,

    /// Seconds between monitoring cycles
    #[arg(long, env = "JOB_MONITOR_INTERVAL", default_value_t = 300)]
    pub interval_secs: u64,

    /// Records requested from each search per cycle
    #[arg(long, env = "JOB_MONITOR_TARGET", default_value_t = 100)]
    pub target_count: usize,

    /// Stop after this many cycles instead of running forever
    #[arg(long, env = "JOB_MONITOR_CYCLES")]
    pub cycles: Option<u64>,

    #[arg(long, value_enum, env = "JOB_MONITOR_PAGINATION", default_value = "offset")]
    pub pagination: PaginationMode,

    #[arg(long, env = "JOB_MONITOR_MAX_PAGES", default_value_t = 40)]
    pub max_pages: usize,

    /// Short polls granted to the lazy result list before accepting what is present
    #[arg(long, env = "JOB_MONITOR_REVEAL_POLLS", default_value_t = 10)]
    pub reveal_polls: u32,

    #[arg(long, env = "JOB_MONITOR_HEADLESS")]
    pub headless: bool,
}

impl Settings {
    pub fn build_config(&self) -> Result<MonitorConfig> {
        let defaults = MonitorConfig::default();
        let config = MonitorConfig {
            pacing: PacingConfig {
                reveal_polls: self.reveal_polls,
                cycle_interval: Duration::from_secs(self.interval_secs),
                ..defaults.pacing
            },
            pagination: PaginationConfig {
                mode: self.pagination,
                max_pages: self.max_pages,
                ..defaults.pagination
            },
            selectors: defaults.selectors,
            target_count: self.target_count,
            max_cycles: self.cycles,
            session_path: self.session.clone(),
            output_path: self.output.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: self.headless,
            ..BrowserOptions::default()
        }
    }
}
