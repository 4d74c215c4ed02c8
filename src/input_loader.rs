use std::fs::File;
use std::path::Path;
use log::{info, error};
use serde::Deserialize;
use calamine::{Reader, open_workbook_auto};

use crate::error::{MonitorError, Result};
use crate::search_query::SearchQuery;

/// One row of a queries file: either a ready URL, or keywords to build one from.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct QueryRow {
    #[serde(default, alias = "URL", alias = "Url", alias = "search_url")]
    pub url: Option<String>,
    #[serde(default, alias = "Keywords", alias = "query", alias = "Query")]
    pub keywords: Option<String>,
    #[serde(default, alias = "Location")]
    pub location: Option<String>,
    #[serde(default, alias = "Posted Within", alias = "f_TPR")]
    pub posted_within: Option<String>,
}

impl QueryRow {
    fn into_query(self) -> Option<SearchQuery> {
        if let Some(url) = non_empty(self.url) {
            return Some(SearchQuery::from_url(url));
        }
        let keywords = non_empty(self.keywords)?;
        let location = non_empty(self.location).unwrap_or_default();
        Some(SearchQuery::from_keywords(&keywords, &location, self.posted_within.as_deref()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Loads the ordered query list from a CSV or XLSX file.
pub fn load_queries<P: AsRef<Path>>(filename: P) -> Result<Vec<SearchQuery>> {
    let path_ref = filename.as_ref();
    if !path_ref.exists() {
        return Err(MonitorError::Input(format!("queries file {:?} does not exist", path_ref)));
    }

    let is_excel = path_ref.extension().map_or(false, |ext| matches!(ext.to_str(), Some("xlsx" | "xlsm" | "xls" | "ods")));
    let rows = if is_excel { load_excel(path_ref)? } else { load_csv(path_ref)? };

    let mut queries = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match row.into_query() {
            Some(query) => queries.push(query),
            None => error!("Row {} of {:?} has neither a url nor keywords; skipped.", i + 1, path_ref),
        }
    }
    info!("Loaded {} search queries from {:?}", queries.len(), path_ref);
    Ok(queries)
}

fn load_csv(path: &Path) -> Result<Vec<QueryRow>> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => error!("Error parsing query row: {}", e),
        }
    }
    Ok(rows)
}

fn load_excel(path: &Path) -> Result<Vec<QueryRow>> {
    let mut excel = open_workbook_auto(path)
        .map_err(|e| MonitorError::Input(format!("could not open workbook {:?}: {}", path, e)))?;

    let mut rows = Vec::new();
    let worksheets = excel.worksheets();
    let Some((_name, range)) = worksheets.first() else {
        return Ok(rows);
    };

    let mut url_idx = None;
    let mut keywords_idx = None;
    let mut location_idx = None;
    let mut posted_idx = None;

    for (row_idx, row) in range.rows().enumerate() {
        if row_idx == 0 {
            for (col_idx, cell) in row.iter().enumerate() {
                let header = cell.to_string().to_lowercase();
                if header.contains("url") { url_idx = Some(col_idx); }
                else if header.contains("keyword") || header.contains("query") { keywords_idx = Some(col_idx); }
                else if header.contains("location") { location_idx = Some(col_idx); }
                else if header.contains("posted") { posted_idx = Some(col_idx); }
            }
            if url_idx.is_none() && keywords_idx.is_none() {
                return Err(MonitorError::Input("workbook header needs a 'url' or 'keywords' column".into()));
            }
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(|c| c.to_string());
        rows.push(QueryRow {
            url: cell(url_idx),
            keywords: cell(keywords_idx),
            location: cell(location_idx),
            posted_within: cell(posted_idx),
        });
    }
    Ok(rows)
}
