//! Error types for the scraping pipeline
//!
//! This module defines the domain error enums used throughout the crate.
//! Only transport failures are allowed to abort a scrape call; everything at
//! article granularity degrades to "skip and continue".

use thiserror::Error;

/// Errors that can occur while fetching a page
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, TLS, body read)
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded its per-attempt timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Server answered with a non-200 status
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Server answered 200 with nothing in the body
    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    /// Every attempt failed; carries the last observed cause
    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    /// Identity string cannot be sent as a header value
    #[error("Invalid client identity: {0}")]
    InvalidIdentity(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Status code of the failure, looking through `RetriesExhausted`
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Whether the failure is worth another attempt
    ///
    /// Every non-200 status counts, 404 included: listing pages on these
    /// sites come back after transient misroutes.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::EmptyBody { .. }
            | Self::Status { .. } => true,
            Self::RetriesExhausted { .. } | Self::InvalidIdentity(_) | Self::Client(_) => false,
        }
    }
}

/// Errors raised while extracting a single article node
///
/// These never leave the extractor: the node is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wrapper matched but no title could be derived
    #[error("Title not found in article node")]
    MissingTitle,

    /// Link attribute present but not resolvable against the base URL
    #[error("Cannot resolve link {href:?}: {reason}")]
    InvalidLink { href: String, reason: String },

    /// Selector string is not valid CSS
    #[error("Invalid CSS selector {css:?}: {reason}")]
    InvalidSelector { css: String, reason: String },
}

/// Errors surfaced to callers of a scrape
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// No site configuration matched and the caller requires one
    #[error("Unsupported site: {host}")]
    UnsupportedSite { host: String },

    /// Input URL could not be parsed or has no host
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// First page could not be fetched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Overall deadline expired before the first page arrived
    #[error("Deadline exceeded while scraping {url}")]
    DeadlineExceeded { url: String },
}
