//! Sumi-Mirror main entry point
//!
//! This is the command-line interface for the Sumi-Mirror web mirror.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_mirror::config::{load_config, validate, Config};
use sumi_mirror::output::log_summary;
use sumi_mirror::{ConfigError, Session};
use tracing_subscriber::EnvFilter;

/// Sumi-Mirror: a resumable same-domain web mirror
///
/// Downloads every page under the start URL into the destination directory.
/// Pages that are already saved are never fetched or written again, so an
/// interrupted mirror can simply be started again.
#[derive(Parser, Debug)]
#[command(name = "sumi-mirror")]
#[command(version)]
#[command(about = "A resumable same-domain web mirror", long_about = None)]
struct Cli {
    /// URL to start mirroring from
    #[arg(short = 'u', long = "url", value_name = "URL")]
    url: Option<String>,

    /// Directory to write the mirror into
    #[arg(short = 'd', long = "dest", value_name = "DIR")]
    dest: Option<String>,

    /// Path to TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum number of pages fetched at once within a level
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,

    /// Treat non-2xx responses as failures instead of saving them
    #[arg(long)]
    skip_error_pages: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("main: starting web mirror");

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let session = Arc::new(Session::from_config(&config)?);
    let shutdown = session.shutdown_handle();

    let mut runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run().await }
    });

    let summary = tokio::select! {
        joined = &mut runner => joined??,
        signal = shutdown_signal() => {
            tracing::info!("main: {}: start shutdown, finishing current level", signal);
            shutdown.request();
            runner.await??
        }
    };

    log_summary(&summary);
    tracing::info!("main: completed");

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_mirror=info,warn"),
            1 => EnvFilter::new("sumi_mirror=debug,info"),
            2 => EnvFilter::new("sumi_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration from the optional file and the command-line flags
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::new(
            cli.url.clone().unwrap_or_default(),
            cli.dest.clone().unwrap_or_default(),
        ),
    };

    if let Some(url) = &cli.url {
        config.mirror.start_url = url.clone();
    }
    if let Some(dest) = &cli.dest {
        config.mirror.dest_dir = dest.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(limit) = cli.max_concurrent {
        config.crawler.max_concurrent_fetches = Some(limit);
    }
    if cli.skip_error_pages {
        config.http.save_error_pages = false;
    }

    validate(&config)?;
    Ok(config)
}

/// Resolves when the process is asked to stop, naming the signal received
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        if let Ok(mut terminate) = signal(SignalKind::terminate()) {
            return tokio::select! {
                _ = interrupt() => "interrupt",
                _ = terminate.recv() => "terminated",
            };
        }
    }

    interrupt().await;
    "interrupt"
}

async fn interrupt() {
    // Without a Ctrl-C handler there is nothing to wait for
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
