//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run (spaces, tabs, newlines) into one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Extract the lowercased host from a URL
///
/// Returns `None` for unparseable URLs and for URLs without a host
/// (`mailto:`, `data:` and friends).
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    parsed.host_str().map(str::to_lowercase)
}

/// Truncate text to a maximum number of characters, appending "..."
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("hello\n\n\tworld"), "hello world");
    }

    #[test]
    fn test_extract_host() {
        assert_eq!(
            extract_host("https://News.Careers360.com/articles?page=2").as_deref(),
            Some("news.careers360.com")
        );
        assert_eq!(extract_host("not a url"), None);
        assert_eq!(extract_host("mailto:desk@example.com"), None);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("very long text here", 10), "very lo...");
        assert_eq!(truncate_text("가나다라마바사", 5), "가나...");
    }
}
