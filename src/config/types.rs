use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Config {
    /// Creates a configuration with default HTTP and crawler settings
    pub fn new(start_url: impl Into<String>, dest_dir: impl Into<String>) -> Self {
        Self {
            mirror: MirrorConfig {
                start_url: start_url.into(),
                dest_dir: dest_dir.into(),
            },
            http: HttpConfig::default(),
            crawler: CrawlerConfig::default(),
        }
    }
}

/// What to mirror and where
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// URL the traversal starts from; also the scope prefix
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Directory the mirrored pages are written under
    #[serde(rename = "dest-dir")]
    pub dest_dir: String,
}

impl MirrorConfig {
    /// Returns the destination directory as a path
    pub fn dest_path(&self) -> PathBuf {
        PathBuf::from(&self.dest_dir)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every request (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Save response bodies even when the status is not 2xx
    #[serde(rename = "save-error-pages", default = "default_save_error_pages")]
    pub save_error_pages: bool,
}

impl HttpConfig {
    /// Returns the request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            save_error_pages: default_save_error_pages(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight within a level; unbounded if absent
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<usize>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("sumi-mirror/{}", env!("CARGO_PKG_VERSION"))
}

fn default_save_error_pages() -> bool {
    true
}
