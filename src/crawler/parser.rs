//! HTML page extractor
//!
//! This module turns a fetched HTML body into an `ExtractedPage`:
//! - The text of the first `<h1>`
//! - The first paragraph, preferring one inside `<main>`
//! - Every `<a href>` and `<img src>`, resolved to absolute URLs
//!
//! Extraction never fails. Bodies that are not markup at all yield an empty
//! record tagged as `Extraction::Degraded`.

use crate::url::resolve_all;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Structured metadata extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// URL the page was fetched from
    pub url: String,

    /// Trimmed text of the first level-1 heading, or empty
    pub heading: String,

    /// Trimmed text of the first paragraph, or empty
    pub first_paragraph: String,

    /// Outgoing links in document order, duplicates kept
    pub links: Vec<String>,

    /// Image URLs in document order, duplicates kept
    pub images: Vec<String>,
}

impl ExtractedPage {
    /// An empty record for a page that yielded nothing
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Outcome of running the extractor over a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Body was parsed as HTML
    Parsed(ExtractedPage),

    /// Body was unusable; every field holds its default
    Degraded(ExtractedPage),
}

impl Extraction {
    /// The extracted record, whichever path produced it
    pub fn page(&self) -> &ExtractedPage {
        match self {
            Self::Parsed(page) | Self::Degraded(page) => page,
        }
    }

    /// Consumes the extraction and returns the record
    pub fn into_page(self) -> ExtractedPage {
        match self {
            Self::Parsed(page) | Self::Degraded(page) => page,
        }
    }

    /// Returns true if the body could not be parsed
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Extracts heading, first paragraph, links and images from an HTML body
///
/// # Arguments
///
/// * `html` - The raw body
/// * `page_url` - The URL the body was fetched from (recorded on the result)
/// * `base_url` - The URL relative `href`/`src` references are resolved against
///
/// # Example
///
/// ```
/// use sitecrawl::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<h1> Hello </h1><p>First</p><a href="/next">next</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = extract_page(html, "https://example.com/", &base).into_page();
/// assert_eq!(page.heading, "Hello");
/// assert_eq!(page.first_paragraph, "First");
/// assert_eq!(page.links, vec!["https://example.com/next"]);
/// ```
pub fn extract_page(html: &str, page_url: &str, base_url: &Url) -> Extraction {
    if !looks_like_markup(html) {
        tracing::debug!("Body of {} is not HTML markup, using empty extraction", page_url);
        return Extraction::Degraded(ExtractedPage::empty(page_url));
    }

    let document = Html::parse_document(html);

    let links = resolve_all(select_attr(&document, "a[href]", "href"), base_url);
    let images = resolve_all(select_attr(&document, "img[src]", "src"), base_url);

    Extraction::Parsed(ExtractedPage {
        url: page_url.to_string(),
        heading: first_text(&document, "h1"),
        first_paragraph: extract_first_paragraph(&document),
        links,
        images,
    })
}

/// First paragraph inside `<main>` if there is one, else the first anywhere
fn extract_first_paragraph(document: &Html) -> String {
    first_element(document, "main p")
        .or_else(|| first_element(document, "p"))
        .map(element_text)
        .unwrap_or_default()
}

fn first_text(document: &Html, selector: &str) -> String {
    first_element(document, selector)
        .map(element_text)
        .unwrap_or_default()
}

fn first_element<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collects an attribute from every matching element, in document order
fn select_attr<'a>(document: &'a Html, selector: &str, attr: &'a str) -> Vec<&'a str> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .collect()
}

/// Returns true if the body contains at least one tag, comment or doctype
fn looks_like_markup(body: &str) -> bool {
    body.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!' || w[1] == b'/'))
}
