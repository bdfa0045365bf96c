//! Multi-page scraping of listing sites
//!
//! This module implements the scrape loop: resolve the site configuration,
//! fetch each page through a call-scoped [`FetchSession`], extract and
//! normalize articles, and aggregate them with cumulative deduplication.
//!
//! [`FetchSession`]: fetcher::FetchSession

pub mod fetcher;
pub mod headers;
pub mod url;

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::models::ExtractedArticle;
use crate::normalize::Normalizer;
use crate::parser::date::DateNormalizer;
use crate::parser::html::ArticleExtractor;
use crate::sites::{SiteConfig, SiteConfigRegistry};
use crate::transform::{apply_all, TransformStep};
use crate::utils::error::{FetchError, ScrapeError};

use self::fetcher::{FetchSession, Fetcher};
use self::url::parse_target;

/// Per-call scrape settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Pages to fetch, including the first
    pub max_pages: u32,

    /// Fail with `UnsupportedSite` instead of using generic extraction
    pub require_site_config: bool,

    /// Wall-clock budget for the whole call
    pub deadline: Option<Duration>,
}

impl ScrapeOptions {
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.scrape.max_pages,
            require_site_config: config.scrape.require_site_config,
            deadline: config.deadline(),
        }
    }

    #[must_use]
    pub fn strict(mut self, require_site_config: bool) -> Self {
        self.require_site_config = require_site_config;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 1,
            require_site_config: false,
            deadline: None,
        }
    }
}

/// Main scraper structure
///
/// Holds only read-only state, so one instance can serve any number of
/// concurrent [`scrape`](Self::scrape) calls.
pub struct Scraper {
    /// Site lookup table
    registry: SiteConfigRegistry,

    /// Shared fetch settings; sessions are opened per call
    fetcher: Fetcher,

    extractor: ArticleExtractor,

    normalizer: Normalizer,

    transforms: Vec<TransformStep>,

    /// Options used by `scrape`
    defaults: ScrapeOptions,
}

impl Scraper {
    /// Create a new scraper instance
    pub fn new(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let fetcher = Fetcher::new(&config.fetch).context("Failed to create fetcher")?;
        let dates = DateNormalizer::from_name(&config.scrape.timezone).map_err(anyhow::Error::msg)?;

        Ok(Self {
            registry: config.registry(),
            fetcher,
            extractor: ArticleExtractor::new(),
            normalizer: Normalizer::new(dates, config.scrape.summary_placeholder.clone()),
            transforms: config.transforms.clone(),
            defaults: ScrapeOptions::from_config(config),
        })
    }

    /// Replace the site registry
    #[must_use]
    pub fn with_registry(mut self, registry: SiteConfigRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &SiteConfigRegistry {
        &self.registry
    }

    /// Scrape up to `max_pages` pages starting at `url`
    ///
    /// Strictness and deadline come from the configuration.
    ///
    /// # Errors
    ///
    /// See [`scrape_with`](Self::scrape_with)
    pub async fn scrape(
        &self,
        url: &str,
        max_pages: u32,
    ) -> Result<Vec<ExtractedArticle>, ScrapeError> {
        let options = ScrapeOptions {
            max_pages,
            ..self.defaults.clone()
        };
        self.scrape_with(url, &options).await
    }

    /// Scrape with explicit options
    ///
    /// Pages are fetched in order. A failed first page aborts the call; a
    /// failed later page is logged and contributes nothing. Deduplication runs
    /// over the cumulative result.
    ///
    /// # Errors
    ///
    /// - `ScrapeError::InvalidUrl` if `url` is not an absolute http(s) URL
    /// - `ScrapeError::UnsupportedSite` if no config matches and one is required
    /// - `ScrapeError::Fetch` if the first page cannot be fetched
    /// - `ScrapeError::DeadlineExceeded` if the deadline expires during page 1
    pub async fn scrape_with(
        &self,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<Vec<ExtractedArticle>, ScrapeError> {
        let url = url.trim();
        let target = parse_target(url)?;
        let host = target.host_str().map(str::to_lowercase).unwrap_or_default();

        let config = self.registry.lookup_host(&host);
        if config.is_none() && options.require_site_config {
            return Err(ScrapeError::UnsupportedSite { host });
        }

        let source = config.map_or_else(|| host.clone(), |c| c.name.clone());
        let last_page = page_limit(config, options.max_pages);
        let deadline = options.deadline.map(|budget| Instant::now() + budget);

        tracing::info!(
            url = %url,
            site = %source,
            configured = config.is_some(),
            pages = last_page,
            "Starting scrape"
        );

        let mut session = self.fetcher.session()?;
        let mut dedup = Deduplicator::new();

        for page in 1..=last_page {
            let page_url = match config {
                Some(site) => site.page_url(url, page),
                None => Some(url.to_string()),
            };
            let Some(page_url) = page_url else {
                break;
            };

            let body = match fetch_page(&mut session, &page_url, deadline).await {
                PageFetch::Body(body) => body,
                PageFetch::Failed(e) if page == 1 => return Err(e.into()),
                PageFetch::Failed(e) => {
                    tracing::warn!(url = %page_url, page, error = %e, "Page fetch failed, skipping");
                    continue;
                }
                PageFetch::DeadlineExpired if page == 1 => {
                    return Err(ScrapeError::DeadlineExceeded {
                        url: url.to_string(),
                    });
                }
                PageFetch::DeadlineExpired => {
                    tracing::warn!(
                        url = %url,
                        page,
                        collected = dedup.len(),
                        "Deadline expired, returning partial results"
                    );
                    break;
                }
            };

            let articles = self.process_page(&body, config, &target, &source);
            if articles.is_empty() {
                tracing::warn!(url = %page_url, page, "No articles found on page");
                continue;
            }

            let found = articles.len();
            let kept = dedup.extend(articles);
            tracing::debug!(url = %page_url, page, found, kept, "Page processed");
        }

        tracing::info!(url = %url, articles = dedup.len(), "Scrape finished");
        Ok(dedup.into_vec())
    }

    /// Run independent scrapes concurrently, one result per input URL
    pub async fn scrape_many(
        &self,
        urls: &[String],
        options: &ScrapeOptions,
    ) -> Vec<Result<Vec<ExtractedArticle>, ScrapeError>> {
        let futures = urls.iter().map(|url| self.scrape_with(url, options));

        futures::future::join_all(futures).await
    }

    /// Extract, normalize and transform one page body
    fn process_page(
        &self,
        body: &str,
        config: Option<&SiteConfig>,
        target: &::url::Url,
        source: &str,
    ) -> Vec<ExtractedArticle> {
        let raws = self.extractor.extract_articles(body, config, target);
        let date_formats = config.map_or(&[][..], |c| c.date_formats.as_slice());

        let mut articles = self.normalizer.normalize_all(raws, source, date_formats);
        apply_all(&self.transforms, &mut articles);
        articles
    }
}

/// Outcome of fetching one page
enum PageFetch {
    Body(String),
    Failed(FetchError),
    DeadlineExpired,
}

async fn fetch_page(
    session: &mut FetchSession,
    url: &str,
    deadline: Option<Instant>,
) -> PageFetch {
    let result = match deadline {
        Some(at) => match tokio::time::timeout_at(at, session.fetch(url)).await {
            Ok(result) => result,
            Err(_) => return PageFetch::DeadlineExpired,
        },
        None => session.fetch(url).await,
    };

    match result {
        Ok(body) => PageFetch::Body(body),
        Err(e) => PageFetch::Failed(e),
    }
}

/// Pages beyond the first need a pagination template
fn page_limit(config: Option<&SiteConfig>, max_pages: u32) -> u32 {
    let requested = max_pages.max(1);
    match config {
        Some(site) if site.pagination.is_some() => requested,
        _ => {
            if requested > 1 {
                tracing::debug!(requested, "No pagination template, fetching first page only");
            }
            1
        }
    }
}
