//! In-call deduplication of extracted articles
//!
//! Two articles are duplicates when their full `(title, link, summary,
//! publishedDate, source)` tuples are equal. The first occurrence wins and
//! the original order is kept. Nothing is remembered across scrape calls.

use std::collections::HashSet;

use crate::models::{DedupKey, ExtractedArticle};

/// Order-preserving accumulator that drops repeated articles
#[derive(Debug, Default)]
pub struct Deduplicator {
    /// Keys already emitted
    seen: HashSet<DedupKey>,

    /// Emitted articles, in first-seen order
    items: Vec<ExtractedArticle>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an article unless an identical one was already added
    ///
    /// Returns `true` if the article was kept.
    pub fn push(&mut self, article: ExtractedArticle) -> bool {
        if !self.seen.insert(article.dedup_key()) {
            return false;
        }

        self.items.push(article);
        true
    }

    /// Add several articles, returning how many were kept
    pub fn extend(&mut self, articles: impl IntoIterator<Item = ExtractedArticle>) -> usize {
        articles
            .into_iter()
            .map(|article| self.push(article))
            .filter(|kept| *kept)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<ExtractedArticle> {
        self.items
    }
}

/// Remove duplicates from a list, keeping first occurrences in order
pub fn dedupe(records: Vec<ExtractedArticle>) -> Vec<ExtractedArticle> {
    let mut deduplicator = Deduplicator::new();
    deduplicator.extend(records);
    deduplicator.into_vec()
}
