//! Crawler module for page fetching and traversal
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML parsing and in-scope link extraction
//! - Level-by-level traversal coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{Session, ShutdownHandle};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, RawResponse};
pub use parser::{extract_links, Page};

use crate::config::Config;
use crate::output::RunSummary;
use crate::MirrorError;

/// Runs a complete mirror operation
///
/// This is the main entry point for a one-shot mirror. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Traverse the site level by level from the start URL
/// 3. Write every page that is not already saved
///
/// # Arguments
///
/// * `config` - The mirror configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Mirror completed
/// * `Err(MirrorError)` - The client could not be built or the configuration is unusable
pub async fn mirror(config: &Config) -> Result<RunSummary, MirrorError> {
    Session::from_config(config)?.run().await
}
