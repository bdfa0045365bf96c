//! Listing-page article extraction with site-specific and generic strategies
//!
//! A page is parsed once, a strategy is chosen from the site configuration
//! (or its absence), and every wrapper node becomes at most one
//! [`RawArticle`]. A node without a title is skipped; a link or image that
//! cannot be resolved leaves that field empty and keeps the node.

use scraper::{ElementRef, Html};
use url::Url;

use crate::crawler::url::resolve_link;
use crate::parser::field::{attr_value, extract_field, text_value};
use crate::parser::selectors::{Candidate, GenericSelectors, DATE_ATTRIBUTES};
use crate::parser::RawArticle;
use crate::sites::SiteConfig;
use crate::utils::error::ParseError;

/// Default attribute read for link candidates
const LINK_ATTRIBUTE: &str = "href";

/// Default attribute read for image candidates
const IMAGE_ATTRIBUTE: &str = "src";

/// How article nodes on a page are located and read
#[derive(Debug, Clone, Copy)]
pub enum ExtractionStrategy<'a> {
    /// Selector waterfall from a known site's configuration
    Configured(&'a SiteConfig),
    /// Heuristics for unrecognized markup
    Generic,
}

impl<'a> ExtractionStrategy<'a> {
    pub fn for_config(config: Option<&'a SiteConfig>) -> Self {
        config.map_or(Self::Generic, Self::Configured)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Configured(_) => "configured",
            Self::Generic => "generic",
        }
    }
}

/// Turns listing-page HTML into raw article records
pub struct ArticleExtractor {
    generic: GenericSelectors,
}

impl ArticleExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generic: GenericSelectors::new(),
        }
    }

    /// Extract every article on a page
    ///
    /// With a `config`, its wrapper and field candidates are used and relative
    /// URLs resolve against `config.base_url`. Without one, generic
    /// heuristics run and relative URLs resolve against `base_url`.
    pub fn extract_articles(
        &self,
        html: &str,
        config: Option<&SiteConfig>,
        base_url: &Url,
    ) -> Vec<RawArticle> {
        let document = Html::parse_document(html);
        self.extract_document(&document, ExtractionStrategy::for_config(config), base_url)
    }

    fn extract_document(
        &self,
        document: &Html,
        strategy: ExtractionStrategy<'_>,
        base_url: &Url,
    ) -> Vec<RawArticle> {
        let root = document.root_element();

        let (nodes, results): (usize, Vec<Result<RawArticle, ParseError>>) = match strategy {
            ExtractionStrategy::Configured(config) => {
                let nodes = configured_nodes(root, config);
                let results = nodes
                    .iter()
                    .map(|node| extract_configured(*node, config))
                    .collect();
                (nodes.len(), results)
            }
            ExtractionStrategy::Generic => {
                let nodes = self.generic_nodes(root);
                let results = nodes
                    .iter()
                    .map(|node| self.extract_generic(*node, base_url))
                    .collect();
                (nodes.len(), results)
            }
        };

        let mut articles = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(article) => articles.push(article),
                Err(ParseError::MissingTitle) => {
                    tracing::debug!(node = index, "Skipping article node without a title");
                }
                Err(e) => {
                    tracing::warn!(node = index, error = %e, "Skipping malformed article node");
                }
            }
        }

        tracing::debug!(
            strategy = strategy.name(),
            nodes,
            extracted = articles.len(),
            "Extracted articles from page"
        );

        articles
    }

    /// Nodes matched by the first generic wrapper selector with any match
    fn generic_nodes<'d>(&self, root: ElementRef<'d>) -> Vec<ElementRef<'d>> {
        self.generic
            .wrappers
            .iter()
            .map(|selector| root.select(selector).collect::<Vec<_>>())
            .find(|nodes| !nodes.is_empty())
            .unwrap_or_default()
    }

    fn extract_generic(
        &self,
        node: ElementRef<'_>,
        base_url: &Url,
    ) -> Result<RawArticle, ParseError> {
        let title_element = node
            .select(self.generic.headings)
            .find(|el| text_value(*el).is_some())
            .or_else(|| {
                node.select(self.generic.title_classes)
                    .find(|el| text_value(*el).is_some())
            })
            .ok_or(ParseError::MissingTitle)?;

        let title = text_value(title_element).ok_or(ParseError::MissingTitle)?;

        // Anchor in the title, anchor around it, then any anchor in the node
        let link = title_element
            .select(self.generic.anchor)
            .next()
            .into_iter()
            .chain(title_anchor_ancestor(title_element, node))
            .chain(node.select(self.generic.anchor))
            .filter_map(|anchor| attr_value(anchor, LINK_ATTRIBUTE))
            .find_map(|href| resolve_optional(base_url, &href, "link"));

        let date = self.generic_date(node);

        let summary = node
            .select(self.generic.paragraphs)
            .filter_map(text_value)
            .find(|text| Some(text) != date.as_ref() && *text != title)
            .or_else(|| {
                node.select(self.generic.summary_classes)
                    .filter_map(text_value)
                    .find(|text| Some(text) != date.as_ref() && *text != title)
            });

        let image = self
            .generic
            .images
            .iter()
            .find_map(|(selector, attr)| node.select(selector).find_map(|el| attr_value(el, attr)))
            .and_then(|src| resolve_optional(base_url, &src, "image"));

        Ok(RawArticle {
            title,
            link,
            summary,
            date,
            image,
        })
    }

    /// Attribute pass over generic date elements, then their text
    fn generic_date(&self, node: ElementRef<'_>) -> Option<String> {
        let elements: Vec<_> = self
            .generic
            .dates
            .iter()
            .filter_map(|selector| node.select(selector).next())
            .collect();

        elements
            .iter()
            .find_map(|el| date_attribute(*el, None))
            .or_else(|| elements.iter().find_map(|el| text_value(*el)))
    }
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Nodes matched by the first wrapper candidate with any match
fn configured_nodes<'d>(root: ElementRef<'d>, config: &SiteConfig) -> Vec<ElementRef<'d>> {
    config
        .fields
        .wrapper
        .iter()
        .map(|candidate| root.select(candidate.selector()).collect::<Vec<_>>())
        .find(|nodes| !nodes.is_empty())
        .unwrap_or_default()
}

fn extract_configured(
    node: ElementRef<'_>,
    config: &SiteConfig,
) -> Result<RawArticle, ParseError> {
    let fields = &config.fields;

    let title = extract_field(node, &fields.title, None).ok_or(ParseError::MissingTitle)?;

    let link = configured_link(node, &fields.link, &config.base_url);

    let summary = extract_field(node, &fields.summary, None);
    let date = configured_date(node, &fields.date);

    let image = extract_field(node, &fields.image, Some(IMAGE_ATTRIBUTE))
        .and_then(|src| resolve_optional(&config.base_url, &src, "image"));

    Ok(RawArticle {
        title,
        link,
        summary,
        date,
        image,
    })
}

/// Link waterfall: the first candidate whose href resolves to an http(s) URL
fn configured_link(node: ElementRef<'_>, candidates: &[Candidate], base: &Url) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        let element = node.select(candidate.selector()).next()?;
        let href = attr_value(element, candidate.attr().unwrap_or(LINK_ATTRIBUTE))?;
        resolve_optional(base, &href, "link")
    })
}

/// Date waterfall preferring machine-readable attributes over visible text
fn configured_date(node: ElementRef<'_>, candidates: &[Candidate]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| {
            let element = node.select(candidate.selector()).next()?;
            date_attribute(element, candidate.attr())
        })
        .or_else(|| extract_field(node, candidates, None))
}

/// Value of the explicit attribute, or of the first known date attribute
fn date_attribute(element: ElementRef<'_>, attr: Option<&str>) -> Option<String> {
    match attr {
        Some(name) => attr_value(element, name),
        None => DATE_ATTRIBUTES
            .iter()
            .find_map(|name| attr_value(element, name)),
    }
}

/// Anchor wrapping the title element, bounded by the article node
fn title_anchor_ancestor<'d>(
    title: ElementRef<'d>,
    node: ElementRef<'d>,
) -> Option<ElementRef<'d>> {
    title
        .ancestors()
        .take_while(|ancestor| ancestor.id() != node.id())
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a" && el.value().attr(LINK_ATTRIBUTE).is_some())
}

/// Resolve an optional URL field; failure leaves the field empty
fn resolve_optional(base: &Url, href: &str, field: &'static str) -> Option<String> {
    match resolve_link(base, href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!(field, error = %e, "Ignoring unresolvable URL");
            None
        }
    }
}
