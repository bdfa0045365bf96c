use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, REFERER,
    USER_AGENT,
};
use url::Url;

/// Default identity rotation list, tried in order after each 403
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Build browser-like headers for a listing page request
///
/// The identity goes out as the `User-Agent`. When a target URL is given,
/// its origin is sent as the `Referer`, the way a reader arriving from the
/// site's own front page would look.
///
/// # Examples
///
/// ```
/// use newsharvest::crawler::headers::build_browser_headers;
/// use reqwest::header::{HeaderValue, USER_AGENT};
/// use url::Url;
///
/// let identity = HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64)");
/// let target = Url::parse("https://www.ndtv.com/education").unwrap();
/// let headers = build_browser_headers(&identity, Some(&target));
/// assert_eq!(headers[USER_AGENT], identity);
/// ```
pub fn build_browser_headers(identity: &HeaderValue, target: Option<&Url>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, identity.clone());
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-IN,en-US;q=0.9,en;q=0.8,hi;q=0.6"),
    );
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    if let Some(referer) = target.and_then(origin_referer) {
        headers.insert(REFERER, referer);
    }

    // Sec-Fetch headers for modern browser compatibility
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    headers
}

/// `scheme://host[:port]/` of the target, if it has a tuple origin
fn origin_referer(target: &Url) -> Option<HeaderValue> {
    let origin = target.origin();
    if !origin.is_tuple() {
        return None;
    }

    HeaderValue::from_str(&format!("{}/", origin.ascii_serialization())).ok()
}
