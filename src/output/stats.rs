//! Statistics gathered over one mirroring run
//!
//! This module provides the counters the traversal engine fills in while it
//! runs, and their rendering to the log.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Summary of one call to `Session::run`
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Number of levels that were fully processed
    pub levels: usize,

    /// Pages written for the first time
    pub pages_written: u64,

    /// Pages whose file already existed
    pub pages_skipped: u64,

    /// Pages whose fetch, parse or save failed
    pub pages_failed: u64,

    /// Links scheduled for a later level
    pub links_discovered: u64,

    /// True if a shutdown request stopped the run before the frontier emptied
    pub interrupted: bool,
}

impl RunSummary {
    /// Creates an empty summary stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            levels: 0,
            pages_written: 0,
            pages_skipped: 0,
            pages_failed: 0,
            links_discovered: 0,
            interrupted: false,
        }
    }

    /// Counts one processed URL
    pub fn record(&mut self, outcome: PageOutcome, links_discovered: usize) {
        match outcome {
            PageOutcome::Written => self.pages_written += 1,
            PageOutcome::Skipped => self.pages_skipped += 1,
            PageOutcome::Failed => self.pages_failed += 1,
        }
        self.links_discovered += links_discovered as u64;
    }

    /// Total number of URLs processed, whatever their outcome
    pub fn pages_processed(&self) -> u64 {
        self.pages_written + self.pages_skipped + self.pages_failed
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a run summary
pub fn log_summary(summary: &RunSummary) {
    let status = if summary.interrupted {
        "stopped by shutdown request"
    } else {
        "completed"
    };

    tracing::info!(
        "Mirror {} after {} levels in {:.2?} (started {})",
        status,
        summary.levels,
        summary.elapsed,
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    tracing::info!(
        "Pages: {} processed, {} written, {} skipped, {} failed",
        summary.pages_processed(),
        summary.pages_written,
        summary.pages_skipped,
        summary.pages_failed
    );

    if summary.pages_failed > 0 {
        tracing::warn!(
            "{} pages could not be mirrored; see errors above",
            summary.pages_failed
        );
    }
}
