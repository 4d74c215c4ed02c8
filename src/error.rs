use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Could not advance to page {page}: {reason}")]
    PageAdvance { page: usize, reason: String },

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Output log error: {0}")]
    Sink(#[from] csv::Error),

    #[error("Query input error: {0}")]
    Input(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
