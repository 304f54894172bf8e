//! Scope checks and resolution for discovered links
//!
//! Scope is a literal string-prefix test against the start URL, not a
//! structured path comparison: `http://d.com/ab` is in scope for a start URL
//! of `http://d.com/a`.

use url::Url;

/// Returns true if a link belongs to the mirrored site
///
/// A link is in scope when it is host-relative (starts with `/`) or when it
/// starts with the literal start URL.
pub fn is_in_scope(start_url: &str, link: &str) -> bool {
    link.starts_with('/') || link.starts_with(start_url)
}

/// Resolves a link to its absolute form
///
/// Host-relative links are joined onto the start URL's origin, which is the
/// start URL itself when it is a bare origin. Protocol-relative links
/// (`//host/path`) take the start URL's scheme. Anything else is assumed to
/// be absolute already and is returned unchanged.
///
/// This is deliberately not plain `start_url + link`: for a start URL with a
/// path, `/x` resolves to `<origin>/x`, not `<start_url>/x`.
///
/// # Example
///
/// ```
/// use sumi_mirror::url::resolve;
///
/// assert_eq!(resolve("http://d.com", "/a"), "http://d.com/a");
/// assert_eq!(resolve("http://d.com", "http://d.com/a"), "http://d.com/a");
/// ```
pub fn resolve(start_url: &str, link: &str) -> String {
    if !link.starts_with('/') {
        return link.to_string();
    }

    let parsed = Url::parse(start_url).ok().filter(Url::has_host);

    if let Some(rest) = link.strip_prefix("//") {
        return match &parsed {
            Some(start) => format!("{}://{}", start.scheme(), rest),
            None => link.to_string(),
        };
    }

    match parsed {
        Some(start) => format!("{}{}", start.origin().ascii_serialization(), link),
        // Not a parseable URL: fall back to plain concatenation
        None => format!("{}{}", start_url.trim_end_matches('/'), link),
    }
}
