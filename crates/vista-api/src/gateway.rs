//! The five backend operations.

use std::sync::Arc;

use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use vista_core::{
    Credentials, Dataset, HistoryEntry, parse_dataset, parse_history, parse_login_response,
};

use crate::config::ApiConfig;
use crate::error::{ApiError, classify_failure, classify_transport_error};
use crate::transport::{
    ApiRequest, ApiResponse, ApiTransport, Endpoint, FilePart, RequestBody, TransportError,
};

/// Multipart field carrying the uploaded CSV.
pub const UPLOAD_FIELD: &str = "file";

/// MIME type declared for uploads.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Result of a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Token to persist and present on authorized calls.
    pub token: String,
    /// Canonical username reported by the backend.
    pub username: Option<String>,
}

impl std::fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// Client for the dashboard backend.
#[derive(Clone)]
pub struct ApiGateway {
    config: ApiConfig,
    transport: Arc<dyn ApiTransport>,
}

impl ApiGateway {
    /// Creates a gateway over `transport`.
    pub fn new(config: ApiConfig, transport: Arc<dyn ApiTransport>) -> Self {
        Self { config, transport }
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Exchanges credentials for a token.
    ///
    /// # Errors
    /// - [`ApiError::Auth`] when the server rejects the credentials.
    /// - [`ApiError::Network`] when no response arrives.
    /// - [`ApiError::Protocol`] when the success body lacks a token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, ApiError> {
        let body = RequestBody::Json(json!({
            "username": credentials.username,
            "password": credentials.password,
        }));
        let response = self.call(Endpoint::Login, None, body).await?;

        let decoded = parse_login_response(&response.body)
            .map_err(|error| ApiError::Protocol(error.to_string()))?;
        let token = decoded
            .token()
            .ok_or_else(|| ApiError::Protocol("login response missing token".to_string()))?
            .to_string();

        Ok(LoginGrant {
            token,
            username: decoded.username,
        })
    }

    /// Asks the backend to revoke `token`.
    ///
    /// Callers treat this as best-effort; the result is meant to be logged,
    /// never shown.
    ///
    /// # Errors
    /// Returns any [`ApiError`] the call produced.
    pub async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.call(Endpoint::Logout, Some(token), RequestBody::Empty)
            .await
            .map(|_| ())
    }

    /// Uploads a CSV file for server-side analysis.
    ///
    /// # Errors
    /// - [`ApiError::SessionExpired`] on 401.
    /// - [`ApiError::Validation`] when the server rejects the file.
    /// - [`ApiError::Network`] when no response arrives.
    /// - [`ApiError::Protocol`] when the success body cannot be decoded.
    pub async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Dataset, ApiError> {
        info!(
            stage = "upload",
            action = "upload_start",
            size_bytes = bytes.len(),
            fingerprint = %upload_fingerprint(&bytes),
        );

        let body = RequestBody::Multipart(FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: file_name.to_string(),
            content_type: CSV_CONTENT_TYPE.to_string(),
            bytes,
        });
        let response = self.call(Endpoint::Upload, Some(token), body).await?;

        parse_dataset(&response.body).map_err(|error| ApiError::Protocol(error.to_string()))
    }

    /// Fetches upload history in server order.
    ///
    /// # Errors
    /// - [`ApiError::SessionExpired`] on 401.
    /// - [`ApiError::Network`] when no response arrives.
    /// - [`ApiError::Protocol`] for other failures.
    pub async fn fetch_history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        let response = self
            .call(Endpoint::History, Some(token), RequestBody::Empty)
            .await?;
        parse_history(&response.body).map_err(|error| ApiError::Protocol(error.to_string()))
    }

    /// Downloads the PDF report for the latest upload.
    ///
    /// # Errors
    /// - [`ApiError::SessionExpired`] on 401.
    /// - [`ApiError::Report`] for every other failure.
    pub async fn download_report(&self, token: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .call(Endpoint::DownloadReport, Some(token), RequestBody::Empty)
            .await?;
        if response.body.is_empty() {
            return Err(ApiError::Report("report body is empty".to_string()));
        }
        Ok(response.body)
    }

    async fn call(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<ApiResponse, ApiError> {
        let url = self
            .config
            .endpoint_url(endpoint.path())
            .map_err(|error| {
                classify_transport_error(endpoint, &TransportError::Request(error.to_string()))
            })?;

        let request = ApiRequest {
            endpoint,
            url,
            authorization: token.map(|token| self.config.authorization(token)),
            body,
        };

        debug!(stage = endpoint.name(), action = "request_sent");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(stage = endpoint.name(), action = "transport_failed", %error);
                return Err(classify_transport_error(endpoint, &error));
            }
        };

        if response.is_success() {
            debug!(
                stage = endpoint.name(),
                action = "response_received",
                status = response.status,
                size_bytes = response.body.len(),
            );
            return Ok(response);
        }

        let failure = classify_failure(endpoint, response.status, &response.body);
        warn!(
            stage = endpoint.name(),
            action = "request_rejected",
            status = response.status,
            kind = failure_kind(&failure),
        );
        Err(failure)
    }
}

/// Short content fingerprint used to correlate uploads in logs.
pub fn upload_fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut encoded = hex::encode(digest);
    encoded.truncate(16);
    encoded
}

fn failure_kind(error: &ApiError) -> &'static str {
    match error {
        ApiError::Auth(_) => "auth",
        ApiError::SessionExpired => "session_expired",
        ApiError::Validation(_) => "validation",
        ApiError::Network(_) => "network",
        ApiError::Protocol(_) => "protocol",
        ApiError::Report(_) => "report",
    }
}
