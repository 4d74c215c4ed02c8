pub mod browser;
pub mod config;
pub mod delay_manager;
pub mod error;
pub mod extractor;
pub mod input_loader;
pub mod ledger;
pub mod logger;
pub mod login;
pub mod monitor;
pub mod record;
pub mod search_query;
pub mod session_store;
pub mod sink;
pub mod walker;

// Exporting types for convenience
pub use browser::{BrowserLauncher, BrowserSession, CardHandle, ChromiumLauncher, ControlState, SessionCookie};
pub use config::{MonitorConfig, PacingConfig, PaginationConfig, PaginationMode, Selectors};
pub use error::{MonitorError, Result};
pub use extractor::{Extraction, Extractor};
pub use ledger::{Classification, SeenLedger};
pub use monitor::{CycleSummary, Monitor, QueryOutcome, QueryReport};
pub use record::JobRecord;
pub use search_query::SearchQuery;
pub use session_store::SessionStore;
pub use sink::{CsvSink, RecordSink};
pub use walker::{PageWalker, StopReason, WalkOutcome};
