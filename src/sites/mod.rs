//! Per-site extraction rules and the registry that selects them
//!
//! A [`SiteConfig`] describes one known listing site: how to recognise it,
//! where its article wrappers are, and an ordered selector waterfall for each
//! field. The [`SiteConfigRegistry`] is immutable after construction and can
//! be shared freely across concurrent scrapes.

mod builtin;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::selectors::Candidate;
use crate::utils::extract_host;

/// Placeholder substituted with the page index in pagination templates
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Ordered candidate selectors for every article field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRules {
    /// Article containers; the first candidate matching at least one node wins
    pub wrapper: Vec<Candidate>,
    pub title: Vec<Candidate>,
    /// Read from `href` unless a candidate names another attribute
    pub link: Vec<Candidate>,
    #[serde(default)]
    pub summary: Vec<Candidate>,
    #[serde(default)]
    pub date: Vec<Candidate>,
    /// Read from `src` unless a candidate names another attribute
    #[serde(default)]
    pub image: Vec<Candidate>,
}

/// Extraction rules for one known site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Substring matched against the lowercased host
    pub pattern: String,

    /// Display name, emitted as the article source
    pub name: String,

    /// Base for resolving relative links
    pub base_url: Url,

    pub fields: FieldRules,

    /// Explicit `chrono` patterns tried after the fuzzy date parse
    #[serde(default)]
    pub date_formats: Vec<String>,

    /// Suffix appended to the scrape URL for pages 2.., containing `{page}`
    #[serde(default)]
    pub pagination: Option<String>,
}

impl SiteConfig {
    /// Whether this config claims the given lowercased host
    pub fn matches_host(&self, host: &str) -> bool {
        host.contains(&self.pattern.to_lowercase())
    }

    /// URL of page `page` (1-based) for a scrape starting at `url`
    ///
    /// Page 1 is `url` verbatim. Later pages need a pagination template.
    pub fn page_url(&self, url: &str, page: u32) -> Option<String> {
        if page <= 1 {
            return Some(url.to_string());
        }

        let template = self.pagination.as_deref()?;
        Some(format!(
            "{url}{}",
            template.replace(PAGE_PLACEHOLDER, &page.to_string())
        ))
    }
}

/// Name and address of a supported site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteSummary {
    pub name: String,
    pub url: String,
}

/// Immutable, ordered collection of site configurations
#[derive(Debug, Clone, Default)]
pub struct SiteConfigRegistry {
    sites: Vec<SiteConfig>,
}

impl SiteConfigRegistry {
    /// Registry holding exactly `sites`, in declaration order
    pub fn new(sites: Vec<SiteConfig>) -> Self {
        Self { sites }
    }

    /// Registry preloaded with the built-in site table
    pub fn builtin() -> Self {
        Self::new(builtin::sites())
    }

    /// Append extra sites after the existing ones
    #[must_use]
    pub fn with_sites(mut self, extra: impl IntoIterator<Item = SiteConfig>) -> Self {
        self.sites.extend(extra);
        self
    }

    /// First registered config whose pattern is a substring of the URL's host
    pub fn lookup(&self, url: &str) -> Option<&SiteConfig> {
        let host = extract_host(url)?;
        self.lookup_host(&host)
    }

    /// Same as [`lookup`](Self::lookup) for an already-extracted host
    pub fn lookup_host(&self, host: &str) -> Option<&SiteConfig> {
        let host = host.to_lowercase();
        self.sites.iter().find(|site| site.matches_host(&host))
    }

    /// Supported sites, in registration order
    pub fn sites(&self) -> Vec<SiteSummary> {
        self.sites
            .iter()
            .map(|site| SiteSummary {
                name: site.name.clone(),
                url: site.base_url.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = SiteConfigRegistry::builtin();
        let site = registry
            .lookup("https://news.careers360.com/exams?page=1")
            .unwrap();
        assert_eq!(site.name, "Careers360");
    }

    #[test]
    fn test_lookup_is_case_insensitive_on_host() {
        let registry = SiteConfigRegistry::builtin();
        let site = registry.lookup("https://WWW.NDTV.COM/education").unwrap();
        assert_eq!(site.name, "NDTV Education");
    }

    #[test]
    fn test_unknown_host_is_none() {
        let registry = SiteConfigRegistry::builtin();
        assert!(registry.lookup("https://blog.example.org/posts").is_none());
        assert!(registry.lookup("not a url").is_none());
    }

    #[test]
    fn test_pattern_only_matches_host() {
        let registry = SiteConfigRegistry::builtin();
        assert!(registry
            .lookup("https://example.org/?ref=careers360.com")
            .is_none());
    }

    #[test]
    fn test_declaration_order_wins() {
        let mut first = builtin::sites().remove(0);
        first.pattern = "example.com".to_string();
        first.name = "First".to_string();
        let mut second = first.clone();
        second.pattern = "news.example.com".to_string();
        second.name = "Second".to_string();

        let registry = SiteConfigRegistry::new(vec![first, second]);
        let site = registry.lookup("https://news.example.com/latest").unwrap();
        assert_eq!(site.name, "First");
    }

    #[test]
    fn test_page_url() {
        let registry = SiteConfigRegistry::builtin();
        let site = registry.lookup("https://news.careers360.com").unwrap();

        assert_eq!(
            site.page_url("https://news.careers360.com", 1).as_deref(),
            Some("https://news.careers360.com")
        );
        assert_eq!(
            site.page_url("https://news.careers360.com", 3).as_deref(),
            Some("https://news.careers360.com?page=3")
        );
    }

    #[test]
    fn test_page_url_without_template() {
        let mut site = builtin::sites().remove(0);
        site.pagination = None;
        assert!(site.page_url("https://x.test", 1).is_some());
        assert!(site.page_url("https://x.test", 2).is_none());
    }

    #[test]
    fn test_sites_listing() {
        let registry = SiteConfigRegistry::builtin();
        let sites = registry.sites();
        assert_eq!(sites.len(), registry.len());
        assert_eq!(sites[0].name, "Careers360");
        assert!(sites[0].url.starts_with("https://news.careers360.com"));
    }

    #[test]
    fn test_site_config_from_toml() {
        let site: SiteConfig = toml::from_str(
            r#"
            pattern = "example.com"
            name = "Example"
            base_url = "https://example.com"
            pagination = "/page/{page}"
            date_formats = ["%d.%m.%Y"]

            [fields]
            wrapper = ["div.item"]
            title = ["h2", "h3"]
            link = [{ css = "a.permalink", attr = "href" }]
            "#,
        )
        .unwrap();

        assert_eq!(site.fields.title.len(), 2);
        assert!(site.fields.summary.is_empty());
        assert_eq!(site.fields.link[0].attr(), Some("href"));
        assert_eq!(
            site.page_url("https://example.com/news", 2).as_deref(),
            Some("https://example.com/news/page/2")
        );
    }
}
