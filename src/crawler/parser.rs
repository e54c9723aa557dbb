//! HTML parser for extracting links and page text
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - The inner markup of `<body>`, stored as the page content
//! - Anchor targets to record as edges and follow

use crate::url::{is_followable, resolve};
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Trimmed `<title>` text, empty if the page has none
    pub title: String,

    /// Inner markup of `<body>`, verbatim
    pub content: String,

    /// Absolute URLs of every followable `<a href>`, in document order
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts title, body and links
///
/// # Link Extraction Rules
///
/// **Include:** every `<a href="...">` in the document, relative or absolute.
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Same-document fragments (`#section`)
/// - References that do not resolve to an HTTP(S) URL
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the document was served from (after redirects)
///
/// # Example
///
/// ```
/// use linkrank::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        content: extract_body(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_body(document: &Html) -> String {
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.inner_html())
        .unwrap_or_default()
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| is_followable(href))
        .filter_map(|href| match resolve(base_url, href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::trace!("Skipping link {:?} on {}: {}", href, base_url, e);
                None
            }
        })
        .collect()
}
