//! Existence check and write-once persistence of pages
//!
//! The existence of a page's file is the only signal used to decide that the
//! page is already mirrored. Files are never rewritten, so their modification
//! time survives any number of later runs.

use crate::crawler::Page;
use crate::state::PageOutcome;
use crate::storage::PageStore;
use crate::url::url_to_local_path;
use crate::MirrorError;
use std::io;
use std::path::Path;

/// Persists a page unless its file already exists
///
/// Parent directories are created first and the file is written afterwards;
/// the two steps are not atomic. A crash in between leaves an empty directory,
/// which a later run still treats as "not saved" because the file is absent.
///
/// # Arguments
///
/// * `store` - The filesystem capability
/// * `dest_dir` - The destination directory of the mirror
/// * `url` - The URL the page was fetched from
/// * `page` - The parsed page
///
/// # Returns
///
/// * `Ok(PageOutcome::Skipped)` - A file already existed and was left untouched
/// * `Ok(PageOutcome::Written)` - The page was written
/// * `Err(MirrorError)` - Path mapping, directory creation or the write failed
pub fn ensure_persisted(
    store: &dyn PageStore,
    dest_dir: &Path,
    url: &str,
    page: &Page,
) -> Result<PageOutcome, MirrorError> {
    let page_path = url_to_local_path(dest_dir, url)?;

    if store.exists(&page_path) {
        log_skip(url);
        return Ok(PageOutcome::Skipped);
    }

    if let Some(parent) = page_path.parent() {
        store
            .create_dir_all(parent)
            .map_err(|e| MirrorError::io(format!("creating directory for {}", url), e))?;
    }

    match store.create_new(&page_path, &page.html()) {
        Ok(()) => {
            tracing::info!("Saved {} to {}", url, page_path.display());
            Ok(PageOutcome::Written)
        }
        // Another task mapped a different URL onto the same file first, or a
        // directory already occupies the path
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            log_skip(url);
            Ok(PageOutcome::Skipped)
        }
        Err(e) => Err(MirrorError::io(format!("writing HTML file for {}", url), e)),
    }
}

/// Loads the saved copy of a page if one exists
///
/// # Returns
///
/// * `Ok(Some(Page))` - The page was already mirrored; its saved HTML is parsed
/// * `Ok(None)` - No file exists yet for this URL
/// * `Err(MirrorError)` - Path mapping or reading the file failed
pub fn load_saved(
    store: &dyn PageStore,
    dest_dir: &Path,
    url: &str,
) -> Result<Option<Page>, MirrorError> {
    let page_path = url_to_local_path(dest_dir, url)?;

    if !store.exists(&page_path) {
        return Ok(None);
    }

    let html = store
        .read_to_string(&page_path)
        .map_err(|e| MirrorError::io(format!("reading saved copy of {}", url), e))?;

    log_skip(url);
    Ok(Some(Page::from_html(url, &html)))
}

fn log_skip(url: &str) {
    tracing::info!("{} already exists, skipping", url);
}
