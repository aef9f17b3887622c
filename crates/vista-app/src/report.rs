//! Saving downloaded PDF reports.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;

/// Destination for downloaded reports.
pub trait ReportSink: Send + Sync {
    /// Persists `bytes` under `file_name` and returns where they landed.
    ///
    /// # Errors
    /// Returns [`ReportError`] when nothing usable was written.
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError>;
}

/// Writes reports into a directory.
///
/// Bytes go to a `.partial` sibling first and are renamed into place, so a
/// failed save never leaves a truncated report behind.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Creates a sink writing into `dir`. The directory is created on first
    /// save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for FileReportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        if !is_plain_file_name(file_name) {
            return Err(ReportError::InvalidName(file_name.to_string()));
        }

        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);
        let partial = self.dir.join(format!("{file_name}.partial"));

        let written = write_synced(&partial, bytes).and_then(|()| fs::rename(&partial, &target));
        if let Err(error) = written {
            match fs::remove_file(&partial) {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    warn!(stage = "report", action = "partial_cleanup_failed", error = %cleanup);
                }
                _ => {}
            }
            return Err(ReportError::Io(error));
        }

        Ok(target)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Report file name for a download started at `now`:
/// `VISTA_Report_<unix-millis>.pdf`.
pub fn report_file_name(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("VISTA_Report_{millis}.pdf")
}

/// Report saving failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing or renaming the file failed.
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),
    /// The requested name would escape the report directory.
    #[error("report file name is not a plain file name: {0}")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for report naming.

    use super::*;

    #[test]
    fn file_name_carries_unix_millis() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        assert_eq!(report_file_name(now), "VISTA_Report_1700000000000.pdf");
    }

    #[test]
    fn rejects_path_like_names() {
        assert!(!is_plain_file_name("../escape.pdf"));
        assert!(!is_plain_file_name(""));
        assert!(is_plain_file_name("VISTA_Report_1.pdf"));
    }
}
