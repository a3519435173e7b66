use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn get_log_path() -> Result<PathBuf> {
    let log_dir = dirs::cache_dir()
        .context("Could not find cache directory")?
        .join("triton");

    Ok(log_dir.join("triton.log"))
}

/// Routes `tracing` output to a log file, since the terminal belongs to the UI.
/// `RUST_LOG` takes precedence over the configured level. Keep the returned
/// guard alive until exit so buffered lines get flushed.
pub fn init(level: &str) -> Result<WorkerGuard> {
    let log_path = get_log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(path = %log_path.display(), "logging initialized");
    Ok(guard)
}
