//! Post-extraction transform steps
//!
//! Steps are a closed set of tagged variants configured as `[[transforms]]`
//! tables. An unknown `type` tag is rejected when the configuration is
//! parsed, never silently skipped at run time.

use serde::{Deserialize, Serialize};

use crate::models::ExtractedArticle;
use crate::utils::truncate_text;

/// A named category and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn matches(&self, haystack: &str) -> bool {
        self.keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .any(|keyword| !keyword.is_empty() && haystack.contains(&keyword))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformStep {
    /// Assign the first category whose keyword occurs in the title or summary
    Categorize { categories: Vec<CategoryRule> },

    /// Shorten summaries longer than `max_chars` characters
    TruncateSummary { max_chars: usize },
}

impl TransformStep {
    /// Apply this step to one article
    ///
    /// An article that already has a category keeps it.
    pub fn apply(&self, article: &mut ExtractedArticle) {
        match self {
            Self::Categorize { categories } => {
                if article.category.is_some() {
                    return;
                }

                let haystack = format!("{} {}", article.title, article.summary).to_lowercase();
                article.category = categories
                    .iter()
                    .find(|rule| rule.matches(&haystack))
                    .map(|rule| rule.name.clone());
            }
            Self::TruncateSummary { max_chars } => {
                if article.summary.chars().count() > *max_chars {
                    article.summary = truncate_text(&article.summary, *max_chars);
                }
            }
        }
    }

    /// Reject steps that could never do anything useful
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Categorize { categories } if categories.is_empty() => {
                Err("categorize step needs at least one category".to_string())
            }
            Self::Categorize { categories } => categories
                .iter()
                .find(|rule| rule.keywords.is_empty())
                .map_or(Ok(()), |rule| {
                    Err(format!("category {:?} has no keywords", rule.name))
                }),
            Self::TruncateSummary { max_chars: 0 } => {
                Err("truncate_summary max_chars must be greater than 0".to_string())
            }
            Self::TruncateSummary { .. } => Ok(()),
        }
    }
}

/// Run every step, in order, over every article
pub fn apply_all(steps: &[TransformStep], articles: &mut [ExtractedArticle]) {
    if steps.is_empty() {
        return;
    }

    for article in articles.iter_mut() {
        for step in steps {
            step.apply(article);
        }
    }
}
