#![warn(missing_docs)]
//! # vista-api
//!
//! ## Purpose
//! Wraps the five backend endpoints consumed by the dashboard.
//!
//! ## Responsibilities
//! - Validate and normalise the configured API base URL.
//! - Attach the `Authorization` header to every authorized call.
//! - Send requests through an injectable [`ApiTransport`].
//! - Normalise HTTP outcomes into the [`ApiError`] taxonomy.
//!
//! ## Data flow
//! View controller calls an [`ApiGateway`] operation with the token it just
//! read from the session manager -> gateway builds an [`ApiRequest`] ->
//! transport returns an [`ApiResponse`] or [`TransportError`] -> gateway
//! decodes the body with `vista-core` or classifies the failure.
//!
//! ## Ownership and lifetimes
//! Requests and responses own their buffers so transports can move them
//! across await points without borrowing from the caller.
//!
//! ## Error model
//! Every failure is one of [`ApiError`]'s variants. A 401 on an authorized
//! call is always [`ApiError::SessionExpired`], whatever the body says.
//!
//! ## Security and privacy notes
//! The gateway logs endpoints, status codes and sizes only. Tokens,
//! credentials and file contents are never logged.

mod config;
mod error;
mod gateway;
mod transport;

pub use config::{
    ApiConfig, DEFAULT_API_BASE, DEFAULT_AUTH_SCHEME, DEFAULT_TIMEOUT, EndpointError,
    validate_api_base,
};
pub use error::{
    ApiError, DEFAULT_LOGIN_FAILURE_MESSAGE, DEFAULT_UPLOAD_FAILURE_MESSAGE, NETWORK_MESSAGE,
    PROTOCOL_MESSAGE, REPORT_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE, classify_failure,
    classify_transport_error,
};
pub use gateway::{ApiGateway, CSV_CONTENT_TYPE, LoginGrant, UPLOAD_FIELD, upload_fingerprint};
pub use transport::{
    ApiRequest, ApiResponse, ApiTransport, Endpoint, FilePart, Method, ReqwestTransport,
    RequestBody, TransportError,
};
