//! Mapping of absolute URLs to files under the destination directory

use crate::{UrlError, UrlResult};
use std::path::{Path, PathBuf};
use url::Url;

/// File name used for URLs whose path ends in `/`
const INDEX_FILE: &str = "index.html";

/// Maps a URL to the file its page is mirrored into
///
/// The layout is `dest_dir/<host>[:port]/<path>`. A path ending in `/`
/// (including the bare origin) gets `index.html` appended; any other path is
/// used verbatim, still percent-encoded as it appears in the URL.
///
/// # Arguments
///
/// * `dest_dir` - The destination directory of the mirror
/// * `url` - The absolute URL of the page
///
/// # Returns
///
/// * `Ok(PathBuf)` - Location of the mirrored file
/// * `Err(UrlError)` - The URL could not be parsed or has no host
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use sumi_mirror::url::url_to_local_path;
///
/// let path = url_to_local_path(Path::new("saved"), "https://example.com/a/b.html").unwrap();
/// assert_eq!(path, Path::new("saved/example.com/a/b.html"));
/// ```
pub fn url_to_local_path(dest_dir: &Path, url: &str) -> UrlResult<PathBuf> {
    let parsed = Url::parse(url).map_err(|source| UrlError::Parse {
        url: url.to_string(),
        source,
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))?;

    let mut path = dest_dir.to_path_buf();
    match parsed.port() {
        Some(port) => path.push(format!("{}:{}", host, port)),
        None => path.push(host),
    }

    // Dot segments are already resolved by the parser, empty ones collapse
    for segment in parsed.path().split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }

    if parsed.path().ends_with('/') {
        path.push(INDEX_FILE);
    }

    Ok(path)
}
