//! URL parsing and link resolution
//!
//! Scrape targets must be absolute http(s) URLs with a host. Links and image
//! sources pulled off a listing page are resolved against a base URL so every
//! emitted record carries an absolute address.

use url::Url;

use crate::utils::error::{ParseError, ScrapeError};

/// Schemes a scrape target or extracted link may use
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Parse and validate a scrape target
///
/// # Errors
///
/// Returns [`ScrapeError::InvalidUrl`] when the input is not an absolute
/// http(s) URL with a host.
///
/// # Examples
///
/// ```
/// use newsharvest::crawler::url::parse_target;
///
/// assert!(parse_target("https://news.careers360.com/exams").is_ok());
/// assert!(parse_target("/relative/path").is_err());
/// assert!(parse_target("ftp://files.example.com").is_err());
/// ```
pub fn parse_target(url: &str) -> Result<Url, ScrapeError> {
    let invalid = |reason: &str| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(invalid("unsupported scheme"));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(parsed)
}

/// Resolve an extracted `href` (absolute or relative) against `base`
///
/// # Errors
///
/// Returns [`ParseError::InvalidLink`] if the reference cannot be joined or
/// resolves to a non-http(s) scheme such as `javascript:` or `mailto:`.
///
/// # Examples
///
/// ```
/// use newsharvest::crawler::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://www.ndtv.com/education").unwrap();
/// assert_eq!(
///     resolve_link(&base, "/education/cbse-results").unwrap(),
///     "https://www.ndtv.com/education/cbse-results"
/// );
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Result<String, ParseError> {
    let href = href.trim();
    let invalid = |reason: String| ParseError::InvalidLink {
        href: href.to_string(),
        reason,
    };

    let resolved = base.join(href).map_err(|e| invalid(e.to_string()))?;

    if !ALLOWED_SCHEMES.contains(&resolved.scheme()) {
        return Err(invalid(format!("unsupported scheme {:?}", resolved.scheme())));
    }

    Ok(resolved.to_string())
}
