//! Tracing setup: a daily rolling file under `$DOCLENS_HOME/logs`.
//!
//! Logs go to a file so they never interleave with the interactive prompt.
//! The filter comes from `DOCLENS_LOG` (e.g. `debug`, `doclens_core=trace`), default `info`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV_VAR: &str = "DOCLENS_LOG";
const LOG_FILE_PREFIX: &str = "doclens.log";

/// Installs the global subscriber writing to `dir`.
///
/// Keep the returned guard alive for the life of the process; dropping it flushes
/// and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
