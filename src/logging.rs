use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pmbot=info";

/// Directory the daily log files are written to.
pub fn log_dir() -> PathBuf {
  dirs::data_local_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("pmbot")
    .join("logs")
}

fn log_filter() -> EnvFilter {
  std::env::var("PMBOT_LOG")
    .ok()
    .and_then(|v| EnvFilter::try_new(v).ok())
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Send tracing output to a daily rolling file, keeping the terminal clean.
///
/// The returned guard flushes pending lines on drop and must be held until exit.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let file_appender = tracing_appender::rolling::daily(&dir, "pmbot.log");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::registry()
    .with(log_filter())
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to initialise logging: {}", e))?;

  Ok(guard)
}
