//! Selector waterfall field extraction
//!
//! Every field of an article (title, link, summary, date, image) is pulled
//! out the same way: walk an ordered list of candidate selectors and keep the
//! first one that yields a non-empty value.

use scraper::ElementRef;

use crate::parser::sanitize::{clean_text, has_content};
use crate::parser::selectors::Candidate;

/// Extract the first non-empty value from an ordered candidate list
///
/// For each candidate the first matching descendant of `node` is inspected.
/// When an attribute is in play (the candidate's own, else `attr`), its value
/// is returned if present and non-empty; otherwise the cleaned text content
/// is returned if non-empty. Returns `None` when no candidate yields anything.
pub fn extract_field(
    node: ElementRef<'_>,
    candidates: &[Candidate],
    attr: Option<&str>,
) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let element = node.select(candidate.selector()).next()?;

        match candidate.attr().or(attr) {
            Some(name) => attr_value(element, name),
            None => text_value(element),
        }
    })
}

/// Trimmed attribute value, `None` when missing or blank
pub fn attr_value(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Cleaned text content, `None` when blank
pub fn text_value(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    if !has_content(&text) {
        return None;
    }

    let cleaned = clean_text(&text);
    (!cleaned.is_empty()).then_some(cleaned)
}
