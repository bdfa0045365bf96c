//! Unified error handling for the newsharvest crate
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while keeping the
//! domain errors available where callers want to match on them.
//!
//! # Architecture
//!
//! - [`HarvestErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust
//! use newsharvest::error::{Error, ErrorCategory, FetchError, HarvestErrorTrait};
//!
//! let err: Error = FetchError::Timeout { url: "https://example.com".into() }.into();
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), ErrorCategory::Network);
//! ```

use std::io;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{FetchError, ParseError, ScrapeError};

/// Common trait for all newsharvest error types
pub trait HarvestErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, retries exhausted)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Input rejected before any request was made
    Input,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Input => "input",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HarvestErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        FetchError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentity(_) | Self::Client(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl HarvestErrorTrait for ParseError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSelector { .. } => ErrorCategory::Config,
            Self::MissingTitle | Self::InvalidLink { .. } => ErrorCategory::Parsing,
        }
    }
}

impl HarvestErrorTrait for ScrapeError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => HarvestErrorTrait::is_recoverable(e),
            Self::DeadlineExceeded { .. } => true,
            Self::UnsupportedSite { .. } | Self::InvalidUrl { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::DeadlineExceeded { .. } => ErrorCategory::Network,
            Self::UnsupportedSite { .. } | Self::InvalidUrl { .. } => ErrorCategory::Input,
        }
    }
}

/// Unified error type for the newsharvest crate
#[derive(Error, Debug)]
pub enum Error {
    /// Scrape-level errors (unsupported site, first page failed)
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HarvestErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scrape(e) => e.is_recoverable(),
            Self::Fetch(e) => HarvestErrorTrait::is_recoverable(e),
            Self::Parse(e) => e.is_recoverable(),
            Self::Io(_) => true, // I/O errors are often transient
            Self::Json(_) | Self::Toml(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scrape(e) => e.category(),
            Self::Fetch(e) => e.category(),
            Self::Parse(e) => e.category(),
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Toml(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
