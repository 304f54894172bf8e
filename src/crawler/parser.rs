//! HTML parsing and link extraction
//!
//! This module turns a fetched body into a navigable [`Page`] and pulls the
//! in-scope anchors out of it.

use crate::state::VisitedSet;
use crate::url::{is_in_scope, resolve};
use scraper::{Html, Selector};

/// A parsed HTML document together with the URL it was fetched from
///
/// Pages are owned by the task that fetched them and dropped once their links
/// are extracted and their file is persisted.
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    /// Parses HTML text into a page
    ///
    /// Parsing is lenient: malformed markup yields a best-effort document
    /// rather than an error.
    pub fn from_html(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            document: Html::parse_document(html),
        }
    }

    /// Returns the URL this page was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serializes the document back to HTML text
    pub fn html(&self) -> String {
        self.document.html()
    }

    /// Returns the `href` of every anchor that has one, in document order
    pub fn hrefs(&self) -> Vec<&str> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        self.document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .collect()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").field("url", &self.url).finish()
    }
}

/// Extracts the links of a page that should be crawled next
///
/// Each anchor's `href` must pass the scope test both as written and after
/// resolution. In-scope links are marked in the visited set; only links that
/// were not already marked are returned, in document order.
///
/// # Arguments
///
/// * `start_url` - The start URL of the session
/// * `visited` - The session's visited set
/// * `page` - The parsed page
///
/// # Returns
///
/// Absolute URLs discovered for the first time in this session
pub fn extract_links(start_url: &str, visited: &VisitedSet, page: &Page) -> Vec<String> {
    let mut next_urls = Vec::new();

    for href in page.hrefs() {
        if !is_in_scope(start_url, href) {
            tracing::trace!("Skipping out-of-scope link {} on {}", href, page.url());
            continue;
        }

        let absolute = resolve(start_url, href);
        if !is_in_scope(start_url, &absolute) {
            tracing::trace!("Skipping {} resolved outside {}", absolute, start_url);
            continue;
        }

        if visited.mark_if_unvisited(&absolute) {
            tracing::debug!("Discovered {} on {}", absolute, page.url());
            next_urls.push(absolute);
        }
    }

    next_urls
}
