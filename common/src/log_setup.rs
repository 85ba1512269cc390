use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "beam_profiler";
const MAX_LOG_FILES: usize = 5;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_filter(base_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .with_context(|| format!("Invalid log filter: {base_level}"))
}

/// Daily-rolling `beam_profiler.*.log` appender in `log_dir`, created if
/// missing. Keeps the newest five files.
pub fn file_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create logs directory {}", log_dir.display()))?;

    Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .context("Failed to create log file appender")
}

/// Console plus daily-rolling file logging into `log_dir`.
///
/// `RUST_LOG` overrides `base_level` when set. Warnings and errors go to
/// stderr, everything else to stdout.
pub fn setup_logging(base_level: &str, log_dir: &Path) -> Result<()> {
    let env_filter = env_filter(base_level)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);
    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logger initialization failed")
}

/// Console-only logging, for tests and short-lived tools.
pub fn setup_console_logging(base_level: &str) -> Result<()> {
    let env_filter = env_filter(base_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Logger initialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn log_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"))
            .collect()
    }

    #[test]
    fn test_file_appender_creates_missing_dir_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let mut appender = file_appender(&log_dir).unwrap();
        appender.write_all(b"waist x=22.4 um\n").unwrap();
        appender.flush().unwrap();

        let files = log_files(&log_dir);
        assert_eq!(files.len(), 1, "{files:?}");
        let text = std::fs::read_to_string(log_dir.join(&files[0])).unwrap();
        assert_eq!(text, "waist x=22.4 um\n");
    }

    // The only test that installs the global subscriber.
    #[test]
    fn test_setup_logging_creates_log_file_once() {
        let dir = tempfile::tempdir().unwrap();

        setup_logging("info", dir.path()).unwrap();
        tracing::info!("log file smoke entry");
        assert_eq!(log_files(dir.path()).len(), 1);

        let err = setup_logging("info", dir.path()).unwrap_err();
        assert!(err.to_string().contains("already initialized"), "{err}");
    }

    #[test]
    fn test_plain_level_is_accepted() {
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("beam_profiler=trace,info").is_ok());
    }
}
