// Core data structures for the scraping pipeline

use serde::{Deserialize, Serialize};

/// Summary used when a listing entry carries no description
pub const SUMMARY_PLACEHOLDER: &str = "No description available";

/// One normalized article record emitted by a scrape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    /// Never empty
    pub title: String,

    /// Absolute URL, empty when the entry had no anchor
    pub link: String,

    #[serde(alias = "description")]
    pub summary: String,

    /// Canonical timestamp, or the raw text when it could not be parsed
    #[serde(alias = "date")]
    pub published_date: Option<String>,

    /// Display name of the site (or host, for unrecognized sites)
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Assigned by the categorize transform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Identity of an article for duplicate suppression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_date: Option<String>,
    pub source: String,
}

impl ExtractedArticle {
    /// Full-tuple key: (title, link, summary, publishedDate, source)
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            title: self.title.clone(),
            link: self.link.clone(),
            summary: self.summary.clone(),
            published_date: self.published_date.clone(),
            source: self.source.clone(),
        }
    }
}

/// Outcome label of a [`ScrapeResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// JSON envelope returned for one scraped URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub status: ResponseStatus,
    pub url: String,
    pub data: Vec<ExtractedArticle>,
    pub message: String,
}

impl ScrapeResponse {
    /// Successful scrape; an empty result carries an advisory message
    pub fn success(url: impl Into<String>, data: Vec<ExtractedArticle>) -> Self {
        let message = if data.is_empty() {
            "No articles found".to_string()
        } else {
            format!("Scraped {} articles", data.len())
        };

        Self {
            status: ResponseStatus::Success,
            url: url.into(),
            data,
            message,
        }
    }

    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            url: url.into(),
            data: Vec::new(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
