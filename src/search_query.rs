use url::Url;

pub const DEFAULT_SEARCH_BASE: &str = "https://www.linkedin.com/jobs/search/";

/// Posted within the last week.
pub const DEFAULT_POSTED_WITHIN: &str = "r604800";

/// One search endpoint the monitor walks every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub label: String,
    pub url: String,
}

impl SearchQuery {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        SearchQuery { label: url.clone(), url }
    }

    /// Builds a job-search URL for `keywords` near `location`.
    pub fn from_keywords(keywords: &str, location: &str, posted_within: Option<&str>) -> Self {
        let mut url = format!("{}?keywords={}", DEFAULT_SEARCH_BASE, urlencoding::encode(keywords.trim()));
        if let Some(window) = posted_within.filter(|w| !w.trim().is_empty()) {
            url.push_str("&f_TPR=");
            url.push_str(&urlencoding::encode(window.trim()));
        }
        if !location.trim().is_empty() {
            url.push_str("&location=");
            url.push_str(&urlencoding::encode(location.trim()));
        }
        SearchQuery {
            label: format!("{} ({})", keywords.trim(), location.trim()),
            url,
        }
    }

    /// URL of result page `index` (zero-based). Page 0 is the query URL itself;
    /// later pages set `param` to `index * page_size`, replacing any value already present.
    pub fn page_url(&self, index: usize, page_size: usize, param: &str) -> String {
        if index == 0 {
            return self.url.clone();
        }
        let offset = (index * page_size).to_string();
        match Url::parse(&self.url) {
            Ok(mut parsed) => {
                let kept: Vec<(String, String)> = parsed
                    .query_pairs()
                    .filter(|(k, _)| k != param)
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                parsed
                    .query_pairs_mut()
                    .clear()
                    .extend_pairs(kept)
                    .append_pair(param, &offset);
                parsed.to_string()
            }
            Err(_) => {
                let joiner = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{}{}={}", self.url, joiner, param, offset)
            }
        }
    }
}

pub fn default_queries() -> Vec<SearchQuery> {
    ["python developer internship", "django developer internship", "backend developer internship"]
        .iter()
        .map(|keywords| SearchQuery::from_keywords(keywords, "India", Some(DEFAULT_POSTED_WITHIN)))
        .collect()
}
