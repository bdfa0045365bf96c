//! HTML parsing and data extraction
//!
//! This module turns listing-page HTML into raw article records: selector
//! candidates, the field waterfall, page-level extraction strategies, and the
//! text and date cleaning applied afterwards.

pub mod date;
pub mod field;
pub mod html;
pub mod sanitize;
pub mod selectors;

// Re-export main extractor and public types
pub use date::DateNormalizer;
pub use field::extract_field;
pub use html::{ArticleExtractor, ExtractionStrategy};
pub use selectors::Candidate;

/// Article fields as found on the page, before normalization
///
/// `title` is always non-empty; every other field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,

    /// Absolute URL
    pub link: Option<String>,

    pub summary: Option<String>,

    /// Raw date text or attribute value
    pub date: Option<String>,

    /// Absolute image URL
    pub image: Option<String>,
}
