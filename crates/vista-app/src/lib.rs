#![warn(missing_docs)]
//! # vista-app
//!
//! ## Purpose
//! Wires the session manager, API gateway and view state machine into the
//! `vista` dashboard client.
//!
//! ## Responsibilities
//! - Load configuration from `VISTA_*` environment variables.
//! - Drive login, upload, history, report export and logout against the
//!   view state, discarding responses that outlive their session.
//! - Save downloaded reports atomically.
//! - Parse shell commands and install structured logging.
//!
//! ## Data flow
//! Shell command -> [`Dashboard`] action -> gateway call -> session update ->
//! view state transition -> rendered screen.
//!
//! ## Ownership and lifetimes
//! [`Dashboard`] owns the view state and session manager for the whole run.
//! Gateway clones are handed to background logout notifications so they can
//! outlive the call that started them.
//!
//! ## Error model
//! Startup failures are [`AppError`]. Once running, every gateway failure is
//! converted into a user-visible message on the view state and never
//! propagates further.
//!
//! ## Security and privacy notes
//! - Passwords and tokens are never logged; usernames are logged by length.
//! - [`redact_sensitive`] strips secret markers from error text before it is
//!   logged.

mod command;
mod config;
mod dashboard;
mod logging;
mod report;

pub use command::{Command, CommandError, HELP_TEXT, parse_command};
pub use config::{
    AppConfig, ConfigError, ENV_API_BASE, ENV_AUTH_SCHEME, ENV_LOG_DIR, ENV_PREVIEW_ROWS,
    ENV_REPORT_DIR, ENV_STATE_FILE, ENV_TIMEOUT_SECS,
};
pub use dashboard::{Dashboard, NOT_AUTHENTICATED_MESSAGE, SESSION_STORE_FAILURE_MESSAGE};
pub use logging::{init_logging, log_file_name};
pub use report::{FileReportSink, ReportError, ReportSink, report_file_name};

use thiserror::Error;
use vista_api::TransportError;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("VISTA_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Redacts common secret markers in log-safe output.
///
/// Everything from the first marker onwards is replaced, so a value that
/// follows its key can never leak.
pub fn redact_sensitive(input: &str) -> String {
    let lower = input.to_ascii_lowercase();
    let first = ["password", "token", "authorization", "bearer"]
        .into_iter()
        .filter_map(|key| lower.find(key).map(|position| (position, key)))
        .min_by_key(|(position, _)| *position);

    match first {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// HTTP client could not be built.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Logging could not be installed.
    #[error("logging error: {0}")]
    Logging(String),
    /// Terminal input or output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
