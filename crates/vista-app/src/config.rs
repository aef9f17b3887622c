//! Runtime configuration loaded from `VISTA_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use vista_api::{ApiConfig, DEFAULT_API_BASE, DEFAULT_AUTH_SCHEME, EndpointError};
use vista_ui::RenderOptions;

/// API base URL.
pub const ENV_API_BASE: &str = "VISTA_API_BASE";
/// Response timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "VISTA_TIMEOUT_SECS";
/// File backing the persistent token store.
pub const ENV_STATE_FILE: &str = "VISTA_STATE_FILE";
/// Directory receiving downloaded reports.
pub const ENV_REPORT_DIR: &str = "VISTA_REPORT_DIR";
/// Number of preview table rows.
pub const ENV_PREVIEW_ROWS: &str = "VISTA_PREVIEW_ROWS";
/// Authorization header prefix.
pub const ENV_AUTH_SCHEME: &str = "VISTA_AUTH_SCHEME";
/// Optional per-run log file directory.
pub const ENV_LOG_DIR: &str = "VISTA_LOG_DIR";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_FILE: &str = ".vista/state.json";
const DEFAULT_REPORT_DIR: &str = ".";

/// Validated application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    api: ApiConfig,
    state_file: PathBuf,
    report_dir: PathBuf,
    render: RenderOptions,
    log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] naming the first invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads settings through `lookup`. Unset and blank variables take their
    /// defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] naming the first invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base = read(ENV_API_BASE).unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = match read(ENV_TIMEOUT_SECS) {
            Some(raw) => positive(ENV_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let preview_rows = match read(ENV_PREVIEW_ROWS) {
            Some(raw) => positive(ENV_PREVIEW_ROWS, &raw)?,
            None => RenderOptions::default().preview_rows as u64,
        };
        let preview_rows =
            usize::try_from(preview_rows).map_err(|_| ConfigError::InvalidValue {
                variable: ENV_PREVIEW_ROWS,
                reason: "value is too large".to_string(),
            })?;

        let api = ApiConfig::new(&base)
            .map_err(|source| ConfigError::Endpoint {
                variable: ENV_API_BASE,
                source,
            })?
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_auth_scheme(
                read(ENV_AUTH_SCHEME).unwrap_or_else(|| DEFAULT_AUTH_SCHEME.to_string()),
            );

        Ok(Self {
            api,
            state_file: PathBuf::from(
                read(ENV_STATE_FILE).unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            ),
            report_dir: PathBuf::from(
                read(ENV_REPORT_DIR).unwrap_or_else(|| DEFAULT_REPORT_DIR.to_string()),
            ),
            render: RenderOptions {
                preview_rows,
                ..RenderOptions::default()
            },
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Gateway settings.
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// File backing the token store.
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// Directory receiving reports.
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Render tunables.
    pub fn render_options(&self) -> RenderOptions {
        self.render
    }

    /// Per-run log directory, when file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

fn positive(variable: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            variable,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(error) => Err(ConfigError::InvalidValue {
            variable,
            reason: error.to_string(),
        }),
    }
}

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value outside its domain.
    #[error("{variable} is invalid: {reason}")]
    InvalidValue {
        /// Offending variable.
        variable: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The API base URL was rejected.
    #[error("{variable} is invalid: {source}")]
    Endpoint {
        /// Offending variable.
        variable: &'static str,
        /// Underlying URL policy violation.
        source: EndpointError,
    },
}
