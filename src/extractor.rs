use chrono::Local;
use log::{debug, warn};

use crate::browser::CardHandle;
use crate::config::Selectors;
use crate::error::Result;
use crate::record::JobRecord;

/// Outcome of reading one listing card.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(JobRecord),
    /// At least one required field was absent, or the card could not be read.
    Incomplete,
}

pub struct Extractor {
    selectors: Selectors,
}

impl Extractor {
    pub fn new(selectors: Selectors) -> Self {
        Extractor { selectors }
    }

    /// Reads title, company, location and link from `card`. Never fails: read
    /// errors are logged and reported as `Incomplete` for this card only.
    pub async fn extract<C: CardHandle + ?Sized>(&self, card: &C) -> Extraction {
        match self.read_fields(card).await {
            Ok(Some(record)) => Extraction::Record(record),
            Ok(None) => {
                debug!("Skipping card with missing fields");
                Extraction::Incomplete
            }
            Err(e) => {
                warn!("Failed to read job card: {}", e);
                Extraction::Incomplete
            }
        }
    }

    async fn read_fields<C: CardHandle + ?Sized>(&self, card: &C) -> Result<Option<JobRecord>> {
        let sel = &self.selectors;
        let Some(title) = card.text(&sel.title).await? else { return Ok(None) };
        let Some(company) = card.text(&sel.company).await? else { return Ok(None) };
        let Some(location) = card.text(&sel.location).await? else { return Ok(None) };
        let Some(link) = card.attribute(&sel.link, &sel.link_attribute).await? else { return Ok(None) };

        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        Ok(Some(JobRecord {
            title: title.to_string(),
            company: company.trim().to_string(),
            location: location.trim().to_string(),
            link,
            scraped_at: Local::now(),
        }))
    }
}
