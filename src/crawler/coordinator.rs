//! Crawler coordinator - level-by-level traversal
//!
//! This module contains the breadth-first loop that drives a mirroring run:
//! - Processing every URL of a level concurrently, one task per URL
//! - Waiting for the whole level before starting the next one
//! - Collecting the links each page discovers into the next level
//! - Stopping between levels when a shutdown is requested

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{extract_links, Page};
use crate::output::RunSummary;
use crate::state::{PageOutcome, VisitedSet};
use crate::storage::{ensure_persisted, load_saved, DiskStore, PageStore};
use crate::{ConfigError, MirrorError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cloneable flag used to stop a session between levels
///
/// Tasks of the level in flight when the request arrives run to completion.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Creates a handle with no shutdown requested
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the session to stop before its next level
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns true once a shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Everything a per-URL task needs, shared by all tasks of a session
struct Pipeline {
    start_url: String,
    dest_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn PageStore>,
    visited: VisitedSet,
}

impl Pipeline {
    /// Runs one URL through the pipeline, reporting and swallowing any error
    async fn process(&self, url: String) -> (PageOutcome, Vec<String>) {
        match self.try_process(&url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Error processing {}: {}", url, e);
                (PageOutcome::Failed, Vec::new())
            }
        }
    }

    async fn try_process(&self, url: &str) -> Result<(PageOutcome, Vec<String>), MirrorError> {
        if let Some(next_urls) = self.follow_saved(url)? {
            return Ok((PageOutcome::Skipped, next_urls));
        }

        let response = self.fetcher.fetch(url).await?;
        tracing::debug!("Fetched {} (HTTP {})", url, response.status);

        self.persist_and_extract(url, &response.body)
    }

    /// Extracts links from the saved copy of an already mirrored page
    fn follow_saved(&self, url: &str) -> Result<Option<Vec<String>>, MirrorError> {
        let Some(page) = load_saved(self.store.as_ref(), &self.dest_dir, url)? else {
            return Ok(None);
        };

        Ok(Some(extract_links(&self.start_url, &self.visited, &page)))
    }

    fn persist_and_extract(
        &self,
        url: &str,
        body: &str,
    ) -> Result<(PageOutcome, Vec<String>), MirrorError> {
        let page = Page::from_html(url, body);
        let outcome = ensure_persisted(self.store.as_ref(), &self.dest_dir, url, &page)?;
        let next_urls = extract_links(&self.start_url, &self.visited, &page);
        Ok((outcome, next_urls))
    }
}

/// One mirroring session: a start URL, a destination and the visited set
///
/// A session can be run more than once. URLs visited by an earlier run stay
/// in the visited set; across processes, resumption relies only on the files
/// already present under the destination directory.
pub struct Session {
    pipeline: Arc<Pipeline>,
    limit: Option<Arc<Semaphore>>,
    shutdown: ShutdownHandle,
}

impl Session {
    /// Creates a session that fetches over HTTP and writes to disk
    ///
    /// Progress and errors are reported through `tracing`.
    ///
    /// # Arguments
    ///
    /// * `start_url` - URL to start from; also the scope prefix
    /// * `dest_dir` - Directory the mirror is written under
    /// * `timeout` - Timeout applied to every HTTP request
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - Ready to run
    /// * `Err(MirrorError::Client)` - The HTTP client could not be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use sumi_mirror::Session;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let session = Session::new("https://blog.example.com/", "saved", Duration::from_secs(10))?;
    /// let summary = session.run().await?;
    /// println!("{} pages written", summary.pages_written);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        start_url: impl Into<String>,
        dest_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, MirrorError> {
        let fetcher = HttpFetcher::with_timeout(timeout)?;
        Ok(Self::with_parts(
            start_url,
            dest_dir,
            Arc::new(fetcher),
            Arc::new(DiskStore::new()),
        ))
    }

    /// Creates a session from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, MirrorError> {
        let fetcher = HttpFetcher::from_config(&config.http)?;
        let session = Self::with_parts(
            config.mirror.start_url.clone(),
            config.mirror.dest_path(),
            Arc::new(fetcher),
            Arc::new(DiskStore::new()),
        );

        Ok(match config.crawler.max_concurrent_fetches {
            Some(limit) => session.with_max_concurrency(limit),
            None => session,
        })
    }

    /// Creates a session from explicit fetcher and storage implementations
    pub fn with_parts(
        start_url: impl Into<String>,
        dest_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                start_url: start_url.into(),
                dest_dir: dest_dir.into(),
                fetcher,
                store,
                visited: VisitedSet::new(),
            }),
            limit: None,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Limits how many URLs of a level are processed at the same time
    ///
    /// Levels are still processed one after the other; a limit of zero is
    /// treated as one.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.limit = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    /// Returns the start URL of the session
    pub fn start_url(&self) -> &str {
        &self.pipeline.start_url
    }

    /// Returns the destination directory of the session
    pub fn dest_dir(&self) -> &Path {
        &self.pipeline.dest_dir
    }

    /// Returns the set of URLs scheduled so far
    pub fn visited(&self) -> &VisitedSet {
        &self.pipeline.visited
    }

    /// Returns a handle that stops the session between levels
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Mirrors every reachable in-scope page
    ///
    /// Per-URL failures are logged and end only that URL's branch. The run
    /// itself fails only when the start URL or destination is empty.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The traversal reached an empty level or was shut down
    /// * `Err(MirrorError::Config)` - Start URL or destination is missing
    pub async fn run(&self) -> Result<RunSummary, MirrorError> {
        let start_url = &self.pipeline.start_url;

        if start_url.is_empty() {
            return Err(ConfigError::Validation("missing start url".to_string()).into());
        }
        if self.pipeline.dest_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("missing dest dir".to_string()).into());
        }

        tracing::info!(
            "Starting mirror of {} into {}",
            start_url,
            self.pipeline.dest_dir.display()
        );

        let started = Instant::now();
        let mut summary = RunSummary::new();

        self.pipeline.visited.mark_if_unvisited(start_url);
        let mut level = vec![start_url.clone()];

        while !level.is_empty() {
            if self.shutdown.is_requested() {
                tracing::warn!(
                    "Shutdown requested, stopping before level {} ({} URLs pending)",
                    summary.levels,
                    level.len()
                );
                summary.interrupted = true;
                break;
            }

            tracing::info!("Level {}: processing {} URLs", summary.levels, level.len());
            level = self.run_level(level, &mut summary).await;
            summary.levels += 1;
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            "Mirror of {} finished: {} pages processed in {:?}",
            start_url,
            summary.pages_processed(),
            summary.elapsed
        );

        Ok(summary)
    }

    /// Processes one level and returns the next one
    async fn run_level(&self, urls: Vec<String>, summary: &mut RunSummary) -> Vec<String> {
        let mut tasks = JoinSet::new();

        for url in urls {
            let pipeline = Arc::clone(&self.pipeline);
            let limit = self.limit.clone();

            tasks.spawn(async move {
                // Held until the task finishes; the semaphore is never closed
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                pipeline.process(url).await
            });
        }

        let mut next_level = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((outcome, next_urls)) => {
                    summary.record(outcome, next_urls.len());
                    next_level.extend(next_urls);
                }
                Err(e) => {
                    tracing::error!("Crawl task failed: {}", e);
                    summary.record(PageOutcome::Failed, 0);
                }
            }
        }

        next_level
    }
}
