//! HTTP transport seam and its `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Backend endpoints consumed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST login/`
    Login,
    /// `POST logout/`
    Logout,
    /// `POST upload/`
    Upload,
    /// `GET history/`
    History,
    /// `GET download-pdf/`
    DownloadReport,
}

impl Endpoint {
    /// Path relative to the API base.
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "login/",
            Self::Logout => "logout/",
            Self::Upload => "upload/",
            Self::History => "history/",
            Self::DownloadReport => "download-pdf/",
        }
    }

    /// HTTP method used for this endpoint.
    pub fn method(self) -> Method {
        match self {
            Self::History | Self::DownloadReport => Method::Get,
            Self::Login | Self::Logout | Self::Upload => Method::Post,
        }
    }

    /// Short name used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Upload => "upload",
            Self::History => "history",
            Self::DownloadReport => "report",
        }
    }
}

/// HTTP method subset used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// One file attached to a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the file.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// `multipart/form-data` with a single file.
    Multipart(FilePart),
}

/// Fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Endpoint being called.
    pub endpoint: Endpoint,
    /// Absolute URL.
    pub url: Url,
    /// `Authorization` header value, when the call is authorized.
    pub authorization: Option<String>,
    /// Request body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// HTTP method for this request.
    pub fn method(&self) -> Method {
        self.endpoint.method()
    }
}

/// Raw response as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Convenience constructor.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract transport used by the gateway.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends `request` and returns whatever response the server produced.
    ///
    /// # Errors
    /// Returns [`TransportError`] only when no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Failures where no HTTP response reached the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The response did not arrive within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request could not be built or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),
}

/// Production transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`TransportError::Request`] when the HTTP client cannot be
    /// constructed (for example, TLS backend initialisation failed).
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Request(error.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = match request.method() {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };

        if let Some(value) = &request.authorization {
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(classify_reqwest_error)?;
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder.send().await.map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify_reqwest_error)?;

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
