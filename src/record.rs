use chrono::{DateTime, Local};
use serde::Serialize;

const KEY_SEPARATOR: char = '\u{1f}';

/// One job posting as captured from a listing card.
///
/// Field order is the column order of the output log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
    pub scraped_at: DateTime<Local>,
}

impl JobRecord {
    /// Composite identity used for deduplication. `link` and `scraped_at` do not participate.
    pub fn identity_key(&self) -> String {
        let mut key = String::with_capacity(self.title.len() + self.company.len() + self.location.len() + 2);
        key.push_str(&self.title);
        key.push(KEY_SEPARATOR);
        key.push_str(&self.company);
        key.push(KEY_SEPARATOR);
        key.push_str(&self.location);
        key
    }
}
