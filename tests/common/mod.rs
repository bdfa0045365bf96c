//! Common test utilities

#![allow(dead_code)]

use newsharvest::config::{Config, FetchConfig};
use newsharvest::crawler::Scraper;
use newsharvest::parser::selectors::{candidates, Candidate};
use newsharvest::sites::{FieldRules, SiteConfig, SiteConfigRegistry};
use url::Url;

/// Identities used by every test fetcher, in rotation order
pub const TEST_IDENTITIES: &[&str] = &["agent-0", "agent-1", "agent-2"];

/// Fetch settings with a short backoff so retry tests stay fast
pub fn fetch_config(max_attempts: u32, backoff_ms: u64) -> FetchConfig {
    FetchConfig {
        max_attempts,
        timeout_secs: 5,
        backoff_ms,
        requests_per_second: 0,
        identities: TEST_IDENTITIES.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn test_config() -> Config {
    Config {
        fetch: fetch_config(2, 10),
        ..Config::default()
    }
}

/// Site configuration claiming the local mock server
pub fn mock_site(server_uri: &str) -> SiteConfig {
    SiteConfig {
        pattern: "127.0.0.1".to_string(),
        name: "Mock Education".to_string(),
        base_url: Url::parse(server_uri).unwrap(),
        fields: FieldRules {
            wrapper: candidates(&["div.story"]).unwrap(),
            title: candidates(&["h2.title", "h2"]).unwrap(),
            link: candidates(&["h2 a", "a"]).unwrap(),
            summary: candidates(&["p.summary"]).unwrap(),
            date: vec![
                Candidate::new("time").unwrap(),
                Candidate::new("span.date").unwrap(),
            ],
            image: candidates(&["img"]).unwrap(),
        },
        date_formats: vec!["%d.%m.%Y %H:%M".to_string()],
        pagination: Some("/page-{page}".to_string()),
    }
}

/// Scraper whose registry contains only the mock site
pub fn mock_scraper(config: &Config, server_uri: &str) -> Scraper {
    Scraper::new(config)
        .unwrap()
        .with_registry(SiteConfigRegistry::new(vec![mock_site(server_uri)]))
}

/// One listing entry in the mock site's markup
pub struct Story<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub summary: Option<&'a str>,
    pub date: Option<&'a str>,
}

impl<'a> Story<'a> {
    pub fn new(slug: &'a str, title: &'a str) -> Self {
        Self {
            slug,
            title,
            summary: Some("Details inside."),
            date: Some("March 5, 2024 10:00 AM"),
        }
    }
}

/// Listing page in the mock site's markup
pub fn listing_page(stories: &[Story<'_>]) -> String {
    let items: String = stories
        .iter()
        .map(|story| {
            let summary = story
                .summary
                .map(|s| format!(r#"<p class="summary">{s}</p>"#))
                .unwrap_or_default();
            let date = story
                .date
                .map(|d| format!(r#"<span class="date">{d}</span>"#))
                .unwrap_or_default();
            format!(
                r#"<div class="story">
                    <h2 class="title"><a href="/articles/{slug}">{title}</a></h2>
                    {summary}
                    {date}
                    <img src="/img/{slug}.jpg">
                </div>"#,
                slug = story.slug,
                title = story.title,
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Education News</title></head>
<body><main>{items}</main></body>
</html>"#
    )
}
