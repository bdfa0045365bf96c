//! Configuration management for newsharvest
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every section has defaults, so a file only needs
//! the keys it wants to change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::crawler::headers::DEFAULT_USER_AGENTS;
use crate::models::SUMMARY_PLACEHOLDER;
use crate::parser::date::{DateNormalizer, DEFAULT_TIMEZONE};
use crate::sites::{SiteConfig, SiteConfigRegistry};
use crate::transform::TransformStep;

/// Separator for the identity list in `NEWSHARVEST_USER_AGENTS`
const IDENTITY_SEPARATOR: char = '|';

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetcher configuration
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Pagination and normalization configuration
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Steps applied to every article after normalization
    #[serde(default)]
    pub transforms: Vec<TransformStep>,

    /// Extra sites, looked up after the built-in table
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per page, including the first
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Sleep between failed attempts in milliseconds (403s do not sleep)
    pub backoff_ms: u64,

    /// Politeness throttle shared by all sessions (0 = unlimited)
    pub requests_per_second: u32,

    /// User-Agent rotation list
    pub identities: Vec<String>,
}

/// Scrape-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Pages fetched per scrape, including the first
    pub max_pages: u32,

    /// IANA reference zone for canonical dates
    pub timezone: String,

    /// Reject hosts without a site configuration instead of falling back
    pub require_site_config: bool,

    /// Optional wall-clock budget for one scrape call
    pub deadline_secs: Option<u64>,

    /// Summary emitted when a listing entry has none
    pub summary_placeholder: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 10,
            backoff_ms: 1000,
            requests_per_second: 0,
            identities: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            timezone: DEFAULT_TIMEZONE.to_string(),
            require_site_config: false,
            deadline_secs: None,
            summary_placeholder: SUMMARY_PLACEHOLDER.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Parse an environment variable, keeping `default` when unset or malformed
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from `NEWSHARVEST_*` environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let identities = std::env::var("NEWSHARVEST_USER_AGENTS")
            .ok()
            .map(|v| {
                v.split(IDENTITY_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.fetch.identities);

        let deadline_secs = std::env::var("NEWSHARVEST_DEADLINE_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(defaults.scrape.deadline_secs);

        Ok(Self {
            fetch: FetchConfig {
                max_attempts: env_or("NEWSHARVEST_MAX_ATTEMPTS", defaults.fetch.max_attempts),
                timeout_secs: env_or("NEWSHARVEST_TIMEOUT_SECS", defaults.fetch.timeout_secs),
                backoff_ms: env_or("NEWSHARVEST_BACKOFF_MS", defaults.fetch.backoff_ms),
                requests_per_second: env_or(
                    "NEWSHARVEST_REQUESTS_PER_SECOND",
                    defaults.fetch.requests_per_second,
                ),
                identities,
            },
            scrape: ScrapeConfig {
                max_pages: env_or("NEWSHARVEST_MAX_PAGES", defaults.scrape.max_pages),
                timezone: std::env::var("NEWSHARVEST_TIMEZONE")
                    .unwrap_or(defaults.scrape.timezone),
                require_site_config: env_or(
                    "NEWSHARVEST_REQUIRE_SITE_CONFIG",
                    defaults.scrape.require_site_config,
                ),
                deadline_secs,
                summary_placeholder: defaults.scrape.summary_placeholder,
            },
            logging: LoggingConfig {
                level: std::env::var("NEWSHARVEST_LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: std::env::var("NEWSHARVEST_LOG_FORMAT")
                    .unwrap_or(defaults.logging.format),
            },
            transforms: Vec::new(),
            sites: Vec::new(),
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetch.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than 0");
        }

        if self.fetch.identities.iter().all(|s| s.trim().is_empty()) {
            anyhow::bail!("identities must contain at least one user agent");
        }

        if self.scrape.max_pages == 0 {
            anyhow::bail!("max_pages must be greater than 0");
        }

        DateNormalizer::from_name(&self.scrape.timezone).map_err(anyhow::Error::msg)?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "log format must be \"text\" or \"json\", got {:?}",
                self.logging.format
            );
        }

        for (index, step) in self.transforms.iter().enumerate() {
            step.validate()
                .map_err(|e| anyhow::anyhow!("transforms[{index}]: {e}"))?;
        }

        for site in &self.sites {
            if site.pattern.trim().is_empty() {
                anyhow::bail!("site {:?} has an empty host pattern", site.name);
            }
        }

        Ok(())
    }

    /// Overall scrape deadline, if configured
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.scrape.deadline_secs.map(Duration::from_secs)
    }

    /// Built-in sites followed by the configured extras
    #[must_use]
    pub fn registry(&self) -> SiteConfigRegistry {
        SiteConfigRegistry::builtin().with_sites(self.sites.iter().cloned())
    }
}
