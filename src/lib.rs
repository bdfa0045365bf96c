//! newsharvest - Site-adaptive news listing scraper
//!
//! Fetches listing pages from known education news sites and extracts
//! structured article records using per-site selector waterfalls, with generic
//! heuristics for unrecognized markup.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`sites`] - Site configurations and the registry that selects them
//! - [`crawler`] - Fetching with retry and identity rotation, multi-page scraping
//! - [`parser`] - HTML parsing, field extraction, text and date cleaning
//! - [`normalize`] - Raw record to canonical article conversion
//! - [`dedup`] - In-call duplicate suppression
//! - [`transform`] - Configurable post-processing steps
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and domain errors
//!
//! # Example
//!
//! ```no_run
//! use newsharvest::config::Config;
//! use newsharvest::crawler::Scraper;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let scraper = Scraper::new(&config)?;
//!     let articles = scraper.scrape("https://news.careers360.com", 2).await?;
//!     println!("{}", serde_json::to_string_pretty(&articles)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod sites;
pub mod transform;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{ScrapeOptions, Scraper};
    pub use crate::error::{Error, ErrorCategory, HarvestErrorTrait, Result};
    pub use crate::models::{ExtractedArticle, ScrapeResponse};
    pub use crate::sites::{SiteConfig, SiteConfigRegistry};
}

// Direct re-exports for convenience
pub use models::ExtractedArticle;
