//! Gateway error taxonomy and HTTP outcome classification.

use thiserror::Error;
use vista_core::server_error_message;

use crate::transport::{Endpoint, TransportError};

/// Shown when any authorized call is answered with 401.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
/// Shown when a login is rejected without a server message.
pub const DEFAULT_LOGIN_FAILURE_MESSAGE: &str = "Invalid credentials";
/// Shown when an upload is rejected without a server message.
pub const DEFAULT_UPLOAD_FAILURE_MESSAGE: &str = "Upload failed. Verify CSV format.";
/// Shown when the backend cannot be reached.
pub const NETWORK_MESSAGE: &str = "Cannot connect to server. Is the backend running?";
/// Shown when a success response cannot be decoded.
pub const PROTOCOL_MESSAGE: &str = "Invalid response from server";
/// Shown when the report cannot be produced or fetched.
pub const REPORT_FAILURE_MESSAGE: &str = "PDF generation failed.";

/// Normalised failure of a gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Credentials were rejected. Carries the message to display.
    #[error("authentication rejected: {0}")]
    Auth(String),
    /// An authorized call was answered with 401.
    #[error("session expired")]
    SessionExpired,
    /// The upload was rejected. Carries the message to display.
    #[error("upload rejected: {0}")]
    Validation(String),
    /// No response reached the client.
    #[error("network failure: {0}")]
    Network(String),
    /// A response arrived but violated the contract.
    #[error("malformed response: {0}")]
    Protocol(String),
    /// The report could not be produced or fetched.
    #[error("report unavailable: {0}")]
    Report(String),
}

impl ApiError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(message) | Self::Validation(message) => message.clone(),
            Self::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            Self::Protocol(_) => PROTOCOL_MESSAGE.to_string(),
            Self::Report(_) => REPORT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Returns `true` when the caller must force a logout.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

/// Classifies a non-2xx response from `endpoint`.
///
/// # Semantics
/// - 401 on any authorized endpoint is [`ApiError::SessionExpired`],
///   regardless of the body.
/// - Login failures are [`ApiError::Auth`] with the server's `error` text.
/// - Upload failures are [`ApiError::Validation`] with the server's `error`
///   text.
/// - Report failures are [`ApiError::Report`].
/// - History and logout failures are [`ApiError::Protocol`]; callers treat
///   them as non-fatal.
pub fn classify_failure(endpoint: Endpoint, status: u16, body: &[u8]) -> ApiError {
    if status == 401 && endpoint != Endpoint::Login {
        return ApiError::SessionExpired;
    }

    let server_message = server_error_message(body);
    match endpoint {
        Endpoint::Login => ApiError::Auth(
            server_message.unwrap_or_else(|| DEFAULT_LOGIN_FAILURE_MESSAGE.to_string()),
        ),
        Endpoint::Upload => ApiError::Validation(
            server_message.unwrap_or_else(|| DEFAULT_UPLOAD_FAILURE_MESSAGE.to_string()),
        ),
        Endpoint::DownloadReport => ApiError::Report(
            server_message.unwrap_or_else(|| format!("server returned status {status}")),
        ),
        Endpoint::History | Endpoint::Logout => {
            ApiError::Protocol(format!("{} returned status {status}", endpoint.name()))
        }
    }
}

/// Classifies a failure where no response was received.
///
/// Report downloads fold transport failures into [`ApiError::Report`]; every
/// other endpoint reports [`ApiError::Network`].
pub fn classify_transport_error(endpoint: Endpoint, error: &TransportError) -> ApiError {
    match endpoint {
        Endpoint::DownloadReport => ApiError::Report(error.to_string()),
        _ => ApiError::Network(error.to_string()),
    }
}
