//! HTTP fetcher with retry, identity rotation and charset decoding
//!
//! This module provides the page fetcher used by the scraper with features
//! including:
//! - User-Agent rotation on 403 responses
//! - Fixed-interval retry for every other failure
//! - Optional shared politeness throttle with governor
//! - Charset detection from headers or `<meta>` with encoding_rs
//!
//! A [`Fetcher`] holds only read-only settings and can be shared by any number
//! of concurrent scrapes. Each scrape opens its own [`FetchSession`], which
//! owns the HTTP client and the rotation cursor, so a 403 seen by one call
//! never changes the identity another call sends.

use crate::config::FetchConfig;
use crate::crawler::headers::build_browser_headers;
use crate::utils::error::FetchError;
use encoding_rs::{Encoding, UTF_8};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use regex::bytes::Regex;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;

/// How far into the body to look for a `<meta charset>` declaration
const META_SNIFF_LEN: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-:.]+)"#).unwrap()
});

/// Status and decoded body of a single HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub body: String,
}

/// Shared, read-only fetch settings
///
/// Cheap to clone; identities and the rate limiter are reference counted.
#[derive(Clone)]
pub struct Fetcher {
    /// Identity rotation list, validated as header values
    identities: Arc<[HeaderValue]>,

    /// Per-attempt timeout
    timeout: Duration,

    /// Attempts per page, including the first
    max_attempts: u32,

    /// Sleep between failed attempts other than 403
    backoff: Duration,

    /// Politeness throttle shared by every session
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("identities", &self.identities.len())
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish()
    }
}

impl Fetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidIdentity` if the identity list is empty or
    /// an entry cannot be sent as a header value
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let identities = config
            .identities
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| HeaderValue::from_str(s).map_err(|_| FetchError::InvalidIdentity(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        if identities.is_empty() {
            return Err(FetchError::InvalidIdentity(
                "identity list is empty".to_string(),
            ));
        }

        let rate_limiter = NonZeroU32::new(config.requests_per_second)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));

        Ok(Self {
            identities: identities.into(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            rate_limiter,
        })
    }

    /// Open a call-scoped session with a fresh client and cursor at 0
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be created
    pub fn session(&self) -> Result<FetchSession, FetchError> {
        let client = Client::builder()
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(FetchSession {
            client,
            identities: Arc::clone(&self.identities),
            cursor: 0,
            timeout: self.timeout,
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            rate_limiter: self.rate_limiter.clone(),
        })
    }
}

/// Per-call fetch context owning its client and identity cursor
pub struct FetchSession {
    client: Client,
    identities: Arc<[HeaderValue]>,
    cursor: usize,
    timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl FetchSession {
    /// Index of the identity the next attempt will send
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Identity the next attempt will send
    pub fn identity(&self) -> &HeaderValue {
        &self.identities[self.cursor]
    }

    /// Fetch a page with the configured attempt budget and timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::RetriesExhausted` once every attempt has failed
    pub async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.fetch_with_retry(url, self.max_attempts, self.timeout)
            .await
    }

    /// Fetch a page, retrying until a 200 with a non-empty body arrives
    ///
    /// A 403 on attempt `a` switches to identity `(a + 1) mod len` and retries
    /// at once. Any other status, a timeout, a transport error or an empty
    /// body sleeps the backoff interval before the next attempt.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::RetriesExhausted` carrying the last observed cause
    pub async fn fetch_with_retry(
        &mut self,
        url: &str,
        max_attempts: u32,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let attempts = max_attempts.max(1);
        let target = Url::parse(url).ok();
        let mut attempt: u32 = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.until_ready().await;
            }

            tracing::debug!(url = %url, attempt, identity = self.cursor, "Fetching page");

            let error = match self.attempt(url, target.as_ref(), timeout).await {
                Ok(result) if result.status == StatusCode::OK.as_u16() => {
                    if !result.body.trim().is_empty() {
                        return Ok(result.body);
                    }
                    FetchError::EmptyBody {
                        url: url.to_string(),
                    }
                }
                Ok(result) => FetchError::Status {
                    url: url.to_string(),
                    status: result.status,
                },
                Err(e) => e,
            };

            let forbidden = error.status() == Some(StatusCode::FORBIDDEN.as_u16());
            attempt += 1;

            if attempt >= attempts || !error.is_recoverable() {
                tracing::warn!(url = %url, attempts, error = %error, "Giving up on page");
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts,
                    last: Box::new(error),
                });
            }

            if forbidden {
                // Attempt index just consumed is `attempt - 1`
                self.cursor = attempt as usize % self.identities.len();
                tracing::warn!(
                    url = %url,
                    attempt = attempt - 1,
                    identity = self.cursor,
                    "Request rejected with 403, rotating identity"
                );
                continue;
            }

            tracing::debug!(
                url = %url,
                attempt = attempt - 1,
                error = %error,
                backoff_ms = self.backoff.as_millis() as u64,
                "Attempt failed, backing off"
            );
            tokio::time::sleep(self.backoff).await;
        }
    }

    /// One GET with the current identity
    async fn attempt(
        &self,
        url: &str,
        target: Option<&Url>,
        timeout: Duration,
    ) -> Result<FetchResult, FetchError> {
        let headers = build_browser_headers(self.identity(), target);

        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        if status != StatusCode::OK.as_u16() {
            return Ok(FetchResult {
                status,
                body: String::new(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;

        Ok(FetchResult {
            status,
            body: decode_body(&bytes, &content_type),
        })
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Decode a response body to a string
///
/// The charset comes from the `Content-Type` header, else from a `<meta>`
/// declaration near the top of the document, else UTF-8. Malformed sequences
/// are replaced rather than rejected.
pub fn decode_body(bytes: &[u8], content_type: &str) -> String {
    let encoding = header_charset(content_type)
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    let (text, _encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Replaced malformed byte sequences");
    }

    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}
