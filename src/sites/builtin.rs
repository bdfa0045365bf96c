//! Built-in table of known education news listing sites
//!
//! Candidate lists are ordered: current markup first, older layouts after.

use url::Url;

use super::{FieldRules, SiteConfig};
use crate::parser::selectors::Candidate;

// Static selector tables are validated by the tests below
macro_rules! text {
    ($($css:expr),+ $(,)?) => {
        vec![$(Candidate::new($css).expect(concat!("Invalid CSS selector: ", $css))),+]
    };
}

macro_rules! attr {
    ($attr:expr; $($css:expr),+ $(,)?) => {
        vec![$(Candidate::with_attr($css, $attr).expect(concat!("Invalid CSS selector: ", $css))),+]
    };
}

fn base(url: &str) -> Url {
    Url::parse(url).expect("Invalid built-in base URL")
}

fn formats(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

/// Built-in site configurations, in lookup priority order
pub(super) fn sites() -> Vec<SiteConfig> {
    vec![
        SiteConfig {
            pattern: "careers360.com".to_string(),
            name: "Careers360".to_string(),
            base_url: base("https://news.careers360.com"),
            fields: FieldRules {
                wrapper: text!["div.newsListBlock", "div.news-list-block", "div.newsBlock"],
                title: text!["h3.headingText", "h2.headingText", ".news-title", "h3"],
                link: attr!["href"; "h3.headingText a", "a.newsTitle", "a"],
                summary: text!["p.content", "div.content p", ".news-desc"],
                date: text!["span.date", "time", ".news-date"],
                image: attr!["src"; "img.newsImg", "img"],
            },
            date_formats: formats(&["%d %b %Y %I:%M %p", "%b %d, %Y %I:%M %p", "%d %b %Y"]),
            pagination: Some("?page={page}".to_string()),
        },
        SiteConfig {
            pattern: "shiksha.com".to_string(),
            name: "Shiksha".to_string(),
            base_url: base("https://www.shiksha.com"),
            fields: FieldRules {
                wrapper: text!["div.articleBox", "ul.article-list > li", "div.artcle-box"],
                title: text!["h2.article-title", "h3 a", "h2", "h3"],
                link: attr!["href"; "h2.article-title a", "h3 a", "a"],
                summary: text!["p.article-desc", "div.desc p", "p"],
                date: text!["span.publish-date", "span.date", "time"],
                image: attr!["data-src"; "img.lazy", "img"],
            },
            date_formats: formats(&["%b %d, %Y %H:%M IST", "%d %b, %Y"]),
            pagination: Some("-{page}".to_string()),
        },
        SiteConfig {
            pattern: "indiatoday.in".to_string(),
            name: "India Today".to_string(),
            base_url: base("https://www.indiatoday.in"),
            fields: FieldRules {
                wrapper: text![
                    "div.B1S3_story__card__A_fhi",
                    "div.catagory-listing",
                    "div.story__grid article"
                ],
                title: text!["h2 a", "h2", "h3"],
                link: attr!["href"; "h2 a", "h3 a", "a"],
                summary: text!["div.B1S3_story__shortcont__inicf p", "div.detail p", "p"],
                date: text!["span.date", "time"],
                image: attr!["src"; "img"],
            },
            date_formats: formats(&["%b %d, %Y %H:%M IST"]),
            pagination: Some("?page={page}".to_string()),
        },
        SiteConfig {
            pattern: "timesofindia.indiatimes.com".to_string(),
            name: "Times of India Education".to_string(),
            base_url: base("https://timesofindia.indiatimes.com"),
            fields: FieldRules {
                wrapper: text!["div.md_news_box", "ul.list5 > li", "div.uwU81"],
                title: text!["span.w_tle a", "figcaption", "span.title", "a"],
                link: attr!["href"; "span.w_tle a", "a"],
                summary: text!["span.w_desc", "p"],
                date: text!["span.time", "span.strlastupd", "time"],
                image: attr!["data-src"; "img"],
            },
            date_formats: formats(&["%b %d, %Y, %H:%M IST", "%d %b %Y, %H:%M"]),
            pagination: Some("/{page}".to_string()),
        },
        SiteConfig {
            pattern: "ndtv.com".to_string(),
            name: "NDTV Education".to_string(),
            base_url: base("https://www.ndtv.com"),
            fields: FieldRules {
                wrapper: text!["div.news_Itm", "li.NwsLstPg-a-li", "div.lst-pg-a"],
                title: text!["h2.newsHdng", "h2.NwsLstPg_ttl", "h2"],
                link: attr!["href"; "h2.newsHdng a", "a.NwsLstPg_ttl-lnk", "a"],
                summary: text!["p.newsCont", "p.NwsLstPg_txt", "p"],
                date: text!["span.posted-by", "span.NwsLstPg_pst_lnk", "time"],
                image: attr!["src"; "img.NwsLstPg_img-full", "img"],
            },
            date_formats: formats(&["%A %B %d, %Y", "%B %d, %Y %I:%M %p IST"]),
            pagination: Some("/page-{page}".to_string()),
        },
        SiteConfig {
            pattern: "hindustantimes.com".to_string(),
            name: "Hindustan Times".to_string(),
            base_url: base("https://www.hindustantimes.com"),
            fields: FieldRules {
                wrapper: text!["div.cartHolder", "div.storyShortDetail"],
                title: text!["h3.hdg3", "h2.hdg3", "h3", "h2"],
                link: attr!["href"; "h3.hdg3 a", "h2.hdg3 a", "a"],
                summary: text!["h2.sortDec", "p"],
                date: text!["div.dateTime", "span.dateTime", "time"],
                image: attr!["src"; "figure img", "img"],
            },
            date_formats: formats(&["%b %d, %Y %I:%M %p IST", "%b %d, %Y"]),
            pagination: Some("/page-{page}".to_string()),
        },
    ]
}
