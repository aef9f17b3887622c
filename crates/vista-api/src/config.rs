//! Gateway configuration and base URL policy.

use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::{Host, Url};

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/";

/// Authorization scheme expected by the backend.
pub const DEFAULT_AUTH_SCHEME: &str = "Token";

/// Response timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
    auth_scheme: String,
}

impl ApiConfig {
    /// Creates a config for `base_url` with default timeout and scheme.
    ///
    /// # Errors
    /// Returns [`EndpointError`] when the URL is unparseable, not HTTP(S), or
    /// cannot carry relative paths.
    pub fn new(base_url: &str) -> Result<Self, EndpointError> {
        Ok(Self {
            base_url: validate_api_base(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
        })
    }

    /// Overrides the response timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the authorization scheme prefix.
    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Normalised base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Response timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Authorization scheme prefix.
    pub fn auth_scheme(&self) -> &str {
        &self.auth_scheme
    }

    /// Resolves `path` relative to the base URL.
    ///
    /// # Errors
    /// Returns [`EndpointError::InvalidUrl`] when the join fails.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, EndpointError> {
        self.base_url
            .join(path)
            .map_err(|error| EndpointError::InvalidUrl(error.to_string()))
    }

    /// Builds the `Authorization` header value for `token`.
    pub fn authorization(&self, token: &str) -> String {
        format!("{} {}", self.auth_scheme, token)
    }
}

/// Validates and normalises an API base URL.
///
/// Plain `http` is accepted because the backend is commonly run locally;
/// it is logged as a warning when the host is not a loopback address.
///
/// # Errors
/// Returns [`EndpointError`] for unparseable URLs, non-HTTP(S) schemes and
/// URLs that cannot be a base.
pub fn validate_api_base(raw: &str) -> Result<Url, EndpointError> {
    let mut parsed =
        Url::parse(raw.trim()).map_err(|error| EndpointError::InvalidUrl(error.to_string()))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            if !is_loopback(&parsed) {
                warn!(
                    stage = "bootstrap",
                    action = "insecure_endpoint",
                    host = parsed.host_str().unwrap_or_default(),
                    "api base uses plain http"
                );
            }
        }
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    }

    if parsed.cannot_be_a_base() {
        return Err(EndpointError::InvalidUrl(
            "api base cannot carry paths".to_string(),
        ));
    }

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(parsed)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(address)) => IpAddr::V4(address).is_loopback(),
        Some(Host::Ipv6(address)) => IpAddr::V6(address).is_loopback(),
        None => false,
    }
}

/// Base URL policy violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// URL could not be parsed or joined.
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    /// Scheme is neither `http` nor `https`.
    #[error("unsupported api scheme: {0}")]
    UnsupportedScheme(String),
}
