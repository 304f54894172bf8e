//! Configuration module for Sumi-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use sumi_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Request timeout: {}s", config.http.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, MirrorConfig, DEFAULT_TIMEOUT_SECS};

// Re-export parser functions
pub use parser::{load_config, parse_config};

pub use validation::validate;
