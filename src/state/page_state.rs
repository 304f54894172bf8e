/// Per-page outcome definitions for the crawl pipeline
///
/// This module defines how a single URL's trip through the pipeline ended.
use std::fmt;

/// Result of processing one URL in a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Page was fetched and its file written for the first time
    Written,

    /// A file for the page already existed and was left untouched
    Skipped,

    /// Fetching, parsing or saving failed; the branch yields no children
    Failed,
}

impl PageOutcome {
    /// Returns true if the page's links were followed
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Returns the outcome as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
