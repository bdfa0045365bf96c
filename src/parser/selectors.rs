//! CSS selector candidates and the generic fallback selector tables
//!
//! A [`Candidate`] is one entry of a selector waterfall: a compiled CSS
//! selector plus an optional attribute to read instead of the text content.
//! The generic tables below are used when no site configuration matches.

use lazy_static::lazy_static;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::utils::error::ParseError;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

/// One candidate selector in an ordered waterfall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CandidateSpec", into = "CandidateSpec")]
pub struct Candidate {
    css: String,
    selector: Selector,
    attr: Option<String>,
}

impl Candidate {
    /// Compile a candidate that reads text content
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidSelector` if `css` is not a valid selector
    pub fn new(css: &str) -> Result<Self, ParseError> {
        let selector = Selector::parse(css).map_err(|e| ParseError::InvalidSelector {
            css: css.to_string(),
            reason: format!("{e:?}"),
        })?;

        Ok(Self {
            css: css.to_string(),
            selector,
            attr: None,
        })
    }

    /// Compile a candidate that reads an attribute
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidSelector` if `css` is not a valid selector
    pub fn with_attr(css: &str, attr: &str) -> Result<Self, ParseError> {
        let mut candidate = Self::new(css)?;
        candidate.attr = Some(attr.to_string());
        Ok(candidate)
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Attribute this candidate targets, if any
    pub fn attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }
}

/// Serialized form of a candidate: either `"css"` or `{ css = "...", attr = "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateSpec {
    Css(String),
    WithAttr { css: String, attr: String },
}

impl TryFrom<CandidateSpec> for Candidate {
    type Error = ParseError;

    fn try_from(spec: CandidateSpec) -> Result<Self, Self::Error> {
        match spec {
            CandidateSpec::Css(css) => Candidate::new(&css),
            CandidateSpec::WithAttr { css, attr } => Candidate::with_attr(&css, &attr),
        }
    }
}

impl From<Candidate> for CandidateSpec {
    fn from(candidate: Candidate) -> Self {
        match candidate.attr {
            Some(attr) => CandidateSpec::WithAttr {
                css: candidate.css,
                attr,
            },
            None => CandidateSpec::Css(candidate.css),
        }
    }
}

/// Compile a list of text candidates
///
/// # Errors
///
/// Returns the first `ParseError::InvalidSelector` encountered
pub fn candidates(css: &[&str]) -> Result<Vec<Candidate>, ParseError> {
    css.iter().map(|s| Candidate::new(s)).collect()
}

/// Attributes that carry machine-readable dates, tried before visible text
pub const DATE_ATTRIBUTES: &[&str] = &["datetime", "data-datetime", "content"];

lazy_static! {
    // Article-like containers, highest priority first
    static ref GENERIC_WRAPPERS: Vec<Selector> = vec![
        parse_selector!("article"),
        parse_selector!("div[class*='article']"),
        parse_selector!("div[class*='news']"),
        parse_selector!("div[class*='post']"),
        parse_selector!("div[class*='story']"),
        parse_selector!("li[class*='news']"),
        parse_selector!("li[class*='article']"),
    ];

    static ref GENERIC_HEADINGS: Selector = parse_selector!("h1, h2, h3, h4");

    static ref GENERIC_TITLE_CLASSES: Selector =
        parse_selector!("[class*='title'], [class*='heading'], [class*='headline']");

    static ref GENERIC_PARAGRAPHS: Selector = parse_selector!("p");

    static ref GENERIC_SUMMARY_CLASSES: Selector = parse_selector!(
        "[class*='desc'], [class*='summary'], [class*='content'], [class*='excerpt']"
    );

    static ref GENERIC_DATES: Vec<Selector> = vec![
        parse_selector!("time"),
        parse_selector!("[class*='date']"),
        parse_selector!("[class*='time']"),
    ];

    static ref GENERIC_IMAGES: Vec<(Selector, &'static str)> = vec![
        (parse_selector!("img[src]"), "src"),
        (parse_selector!("img[data-src]"), "data-src"),
    ];

    static ref ANCHOR: Selector = parse_selector!("a[href]");
}

/// Selectors for pages without a site configuration
pub struct GenericSelectors {
    pub wrappers: &'static [Selector],
    pub headings: &'static Selector,
    pub title_classes: &'static Selector,
    pub paragraphs: &'static Selector,
    pub summary_classes: &'static Selector,
    pub dates: &'static [Selector],
    pub images: &'static [(Selector, &'static str)],
    pub anchor: &'static Selector,
}

impl GenericSelectors {
    pub fn new() -> Self {
        Self {
            wrappers: &GENERIC_WRAPPERS,
            headings: &GENERIC_HEADINGS,
            title_classes: &GENERIC_TITLE_CLASSES,
            paragraphs: &GENERIC_PARAGRAPHS,
            summary_classes: &GENERIC_SUMMARY_CLASSES,
            dates: &GENERIC_DATES,
            images: &GENERIC_IMAGES,
            anchor: &ANCHOR,
        }
    }
}

impl Default for GenericSelectors {
    fn default() -> Self {
        Self::new()
    }
}
