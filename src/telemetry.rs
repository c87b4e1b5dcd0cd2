use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::Config;

// Dropping the guard stops the background log writer.
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Installs the global subscriber: daily rolling file, plain text.
/// Calling it again after a successful init does nothing.
pub fn init(config: &Config) -> Result<()> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let file_appender = rolling::daily(&config.log_dir, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    let _ = LOG_GUARD.set(guard);
    tracing::info!(log_dir = %config.log_dir, "Logging initialised");
    Ok(())
}
