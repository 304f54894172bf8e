use crate::config::types::{Config, CrawlerConfig, HttpConfig, MirrorConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_mirror_config(&config.mirror)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the start URL and destination directory
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    if config.start_url.is_empty() {
        return Err(ConfigError::Validation("missing start url".to_string()));
    }

    if config.dest_dir.is_empty() {
        return Err(ConfigError::Validation("missing dest dir".to_string()));
    }

    let url = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start url '{}': {}", config.start_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start url '{}' must use http or https",
            config.start_url
        )));
    }

    if !url.has_host() {
        return Err(ConfigError::InvalidUrl(format!(
            "Start url '{}' has no host",
            config.start_url
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches == Some(0) {
        return Err(ConfigError::Validation(
            "max_concurrent_fetches must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
