//! Logging setup for the CLI
//!
//! - Human-readable output on stderr, so stdout stays pure JSON
//! - Optional JSON log file with size and daily rotation (10MB per file)

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "couchdb=info,couchdb_rs=info";

/// Initialize tracing, optionally also writing JSON logs under `log_dir`.
///
/// Returns a guard that must be kept alive to ensure file logs are flushed.
pub fn init_telemetry(log_dir: Option<&Path>, verbose: u8) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()?;
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;

    // couchdb.log, rotated daily or at 10 MB, keeping up to 10 files
    let file_appender = RollingFileAppender::new(
        log_dir.join("couchdb.log"),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024),
        9,
    )?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_current_span(true)
        .with_target(true)
        .with_thread_ids(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("File logging to {:?}", log_dir);

    Ok(Some(guard))
}

fn default_filter(verbose: u8) -> String {
    match verbose {
        0 => DEFAULT_FILTER.to_string(),
        1 => "couchdb=debug,couchdb_rs=debug".to_string(),
        _ => "couchdb=trace,couchdb_rs=trace,reqwest=debug".to_string(),
    }
}
