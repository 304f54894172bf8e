//! Visited-URL bookkeeping shared by every task of a session

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of absolute URLs that have already been scheduled
///
/// URLs are compared as raw strings, no normalization is applied. The only
/// mutation is [`VisitedSet::mark_if_unvisited`], which checks and inserts
/// under one lock so two tasks can never both schedule the same URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - The URL was absent and is now marked
    /// * `false` - The URL had already been marked
    pub fn mark_if_unvisited(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Returns true if the URL has been marked
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Returns the number of marked URLs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been marked yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-operation
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
