//! Tracing subscriber setup with an optional per-run log file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use time::OffsetDateTime;
use time::macros::format_description;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

use crate::AppError;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// Console output goes to stderr so rendered screens on stdout stay clean.
/// When `log_dir` is given, events are also appended to
/// `<log_dir>/<YYYYMMDD_HHMMSS>_log.txt`, whose path is returned.
///
/// # Errors
/// Returns [`AppError::Logging`] when the log file cannot be created or a
/// subscriber is already installed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<PathBuf>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|error| {
                AppError::Logging(format!(
                    "unable to create log dir '{}': {error}",
                    dir.display()
                ))
            })?;
            let path = dir.join(log_file_name(OffsetDateTime::now_utc()));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|error| {
                    AppError::Logging(format!(
                        "unable to create log file '{}': {error}",
                        path.display()
                    ))
                })?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))?;

    Ok(log_path)
}

/// Per-run log file name for a run started at `now`.
pub fn log_file_name(now: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    let stamp = now
        .format(&format)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    format!("{stamp}_log.txt")
}

#[cfg(test)]
mod tests {
    //! Unit tests for log file naming.

    use super::*;

    #[test]
    fn log_file_name_is_compact_utc() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        assert_eq!(log_file_name(now), "20231114_221320_log.txt");
    }
}
