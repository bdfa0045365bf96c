//! Raw-to-canonical article normalization
//!
//! Turns a [`RawArticle`] into an [`ExtractedArticle`]: text fields are
//! cleaned, the date goes through the [`DateNormalizer`], a missing summary
//! becomes the placeholder and the source name is attached.

use crate::models::{ExtractedArticle, SUMMARY_PLACEHOLDER};
use crate::parser::date::DateNormalizer;
use crate::parser::sanitize::clean_text;
use crate::parser::RawArticle;

#[derive(Debug, Clone)]
pub struct Normalizer {
    dates: DateNormalizer,
    summary_placeholder: String,
}

impl Normalizer {
    pub fn new(dates: DateNormalizer, summary_placeholder: impl Into<String>) -> Self {
        Self {
            dates,
            summary_placeholder: summary_placeholder.into(),
        }
    }

    pub fn dates(&self) -> &DateNormalizer {
        &self.dates
    }

    /// Normalize one raw article
    ///
    /// Returns `None` when the title is empty after cleaning; such a record is
    /// never emitted. `date_formats` are the site's explicit patterns.
    pub fn normalize(
        &self,
        raw: RawArticle,
        source: &str,
        date_formats: &[String],
    ) -> Option<ExtractedArticle> {
        let title = clean_text(&raw.title);
        if title.is_empty() {
            return None;
        }

        let summary = raw
            .summary
            .as_deref()
            .map(clean_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.summary_placeholder.clone());

        let date_text = raw.date.as_deref().map(clean_text);
        let published_date = self.dates.parse(date_text.as_deref(), date_formats);

        Some(ExtractedArticle {
            title,
            link: raw.link.map(|l| l.trim().to_string()).unwrap_or_default(),
            summary,
            published_date,
            source: source.to_string(),
            image: raw.image.filter(|i| !i.trim().is_empty()),
            category: None,
        })
    }

    /// Normalize a page worth of raw articles, dropping untitled ones
    pub fn normalize_all(
        &self,
        raws: Vec<RawArticle>,
        source: &str,
        date_formats: &[String],
    ) -> Vec<ExtractedArticle> {
        raws.into_iter()
            .filter_map(|raw| self.normalize(raw, source, date_formats))
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DateNormalizer::default(), SUMMARY_PLACEHOLDER)
    }
}
