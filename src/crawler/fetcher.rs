//! HTTP fetcher implementation
//!
//! This module handles all network retrieval for the crawler, including:
//! - Building the HTTP client with the configured timeout and user agent
//! - The [`Fetcher`] trait the traversal engine depends on
//! - Classifying transport failures and, optionally, error statuses
//! - Decoding bodies to text with the declared charset

use crate::config::HttpConfig;
use crate::MirrorError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Raw result of retrieving a URL
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body decoded with the charset the server declared
    ///
    /// Falls back to UTF-8; byte sequences that do not decode are replaced
    /// rather than rejected.
    pub body: String,
}

/// Network retrieval capability used by the crawl pipeline
///
/// The traversal engine receives a fetcher at construction, so tests can
/// substitute a fake that never touches the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves a URL
    ///
    /// # Returns
    ///
    /// * `Ok(RawResponse)` - The status and body
    /// * `Err(MirrorError::Network)` - The request failed in transport
    /// * `Err(MirrorError::Parse)` - The body could not be read or decompressed
    /// * `Err(MirrorError::HttpStatus)` - Non-2xx status with error pages disabled
    async fn fetch(&self, url: &str) -> Result<RawResponse, MirrorError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::HttpConfig;
/// use sumi_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    client_with(&config.user_agent, config.timeout())
}

fn client_with(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP with a shared client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    save_error_pages: bool,
}

impl HttpFetcher {
    /// Creates a fetcher around an existing client
    ///
    /// When `save_error_pages` is false, non-2xx responses are reported as
    /// [`MirrorError::HttpStatus`] instead of being returned.
    pub fn new(client: Client, save_error_pages: bool) -> Self {
        Self {
            client,
            save_error_pages,
        }
    }

    /// Builds the client and fetcher from HTTP configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::new(client, config.save_error_pages))
    }

    /// Builds a fetcher with default settings and the given request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let defaults = HttpConfig::default();
        let client = client_with(&defaults.user_agent, timeout)?;
        Ok(Self::new(client, defaults.save_error_pages))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawResponse, MirrorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MirrorError::Network {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            if !self.save_error_pages {
                return Err(MirrorError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            tracing::debug!("{} returned HTTP {}, keeping body", url, status.as_u16());
        }

        let body = response.text().await.map_err(|e| MirrorError::Parse {
            url: url.to_string(),
            message: format!("reading body: {}", e),
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}
