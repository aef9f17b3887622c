#![warn(missing_docs)]
//! # vista-core
//!
//! ## Purpose
//! Defines the wire data model shared across the `vista` workspace.
//!
//! ## Responsibilities
//! - Represent login credentials and the login response contract.
//! - Represent the aggregate [`Dataset`] returned by a CSV upload.
//! - Represent upload [`HistoryEntry`] records.
//! - Decode backend JSON bodies into owned values.
//!
//! ## Data flow
//! The API gateway receives raw response bytes and calls [`parse_dataset`],
//! [`parse_history`] or [`parse_login_response`]. The decoded values are handed
//! to the view controller, which owns them for the lifetime of the session.
//!
//! ## Ownership and lifetimes
//! All decoded values own their strings and JSON maps so they can outlive the
//! transient network buffers they were decoded from.
//!
//! ## Error model
//! Undecodable bodies return [`CoreError::Decode`]. Fields that the backend
//! may legitimately omit are modelled as `Option` and never fail decoding.
//!
//! ## Security and privacy notes
//! [`Credentials`] implements a redacting `Debug` so that passwords never reach
//! log output by accident.
//!
//! ## Example
//! ```rust
//! use vista_core::parse_dataset;
//!
//! let raw = br#"{"total_count":2,"averages":{"avg_flowrate":1.5}}"#;
//! let dataset = parse_dataset(raw).unwrap();
//! assert_eq!(dataset.total_count, Some(2));
//! assert_eq!(dataset.averages.avg_pressure, None);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Row key holding the equipment name.
pub const FIELD_EQUIPMENT_NAME: &str = "Equipment Name";
/// Row key holding the equipment type.
pub const FIELD_TYPE: &str = "Type";
/// Row key holding the measured flowrate.
pub const FIELD_FLOWRATE: &str = "Flowrate";

/// User-provided login credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from owned or borrowed strings.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns `true` when either field is blank after trimming.
    pub fn is_incomplete(&self) -> bool {
        self.username.trim().is_empty() || self.password.trim().is_empty()
    }

    /// Wipes both fields.
    pub fn clear(&mut self) {
        self.username.clear();
        self.password.clear();
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username_len", &self.username.len())
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login payload.
///
/// Only `token` is required by the client; the remaining fields are optional
/// profile details the backend sends alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    /// Opaque credential presented on authorized calls.
    pub token: Option<String>,
    /// Canonical username of the authenticated account.
    pub username: Option<String>,
    /// Backend user id.
    pub user_id: Option<u64>,
    /// Account email address.
    pub email: Option<String>,
}

impl LoginResponse {
    /// Returns the token when present and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Averages computed server-side over the uploaded rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Averages {
    /// Mean flowrate.
    pub avg_flowrate: Option<f64>,
    /// Mean pressure.
    pub avg_pressure: Option<f64>,
    /// Mean temperature.
    pub avg_temp: Option<f64>,
}

/// One row of the uploaded CSV as echoed back by the backend.
///
/// Rows are free-form JSON objects; the dashboard only reads a handful of
/// well-known keys and tolerates any of them being missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord(Map<String, Value>);

impl RowRecord {
    /// Wraps an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the display text of `key`, or `None` when the value is absent,
    /// null or blank.
    pub fn display_value(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(format_number(number)),
            Value::Bool(flag) => Some(flag.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Equipment name cell.
    pub fn equipment_name(&self) -> Option<String> {
        self.display_value(FIELD_EQUIPMENT_NAME)
    }

    /// Equipment type cell.
    pub fn equipment_type(&self) -> Option<String> {
        self.display_value(FIELD_TYPE)
    }

    /// Flowrate cell.
    pub fn flowrate(&self) -> Option<String> {
        self.display_value(FIELD_FLOWRATE)
    }
}

/// Aggregate result of one CSV upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Number of rows the backend accepted.
    pub total_count: Option<u64>,
    /// Column averages.
    #[serde(deserialize_with = "null_as_default")]
    pub averages: Averages,
    /// Equipment count per type, when the backend reports it.
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: BTreeMap<String, u64>,
    /// Leading rows of the upload, in file order.
    #[serde(deserialize_with = "null_as_default")]
    pub raw_data: Vec<RowRecord>,
}

impl Dataset {
    /// Returns at most `limit` leading rows.
    pub fn preview(&self, limit: usize) -> &[RowRecord] {
        let end = self.raw_data.len().min(limit);
        &self.raw_data[..end]
    }
}

/// Record of one past upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    /// Backend record id.
    pub id: Option<u64>,
    /// Uploaded file name.
    pub name: Option<String>,
    /// Upload timestamp (RFC 3339).
    pub date: Option<String>,
}

/// Decodes a login response body.
///
/// # Errors
/// Returns [`CoreError::Decode`] when the body is not a JSON object.
pub fn parse_login_response(raw: &[u8]) -> Result<LoginResponse, CoreError> {
    serde_json::from_slice(raw).map_err(CoreError::Decode)
}

/// Decodes an upload response body.
///
/// # Errors
/// Returns [`CoreError::Decode`] when the body is not a JSON object or a known
/// field has the wrong type.
pub fn parse_dataset(raw: &[u8]) -> Result<Dataset, CoreError> {
    serde_json::from_slice(raw).map_err(CoreError::Decode)
}

/// Decodes a history response body, preserving server order.
///
/// # Errors
/// Returns [`CoreError::Decode`] when the body is not a JSON array of objects.
pub fn parse_history(raw: &[u8]) -> Result<Vec<HistoryEntry>, CoreError> {
    serde_json::from_slice(raw).map_err(CoreError::Decode)
}

/// Extracts the `error` message from a JSON failure body, if any.
pub fn server_error_message(raw: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    serde_json::from_slice::<ErrorBody>(raw)
        .ok()?
        .error
        .filter(|message| !message.trim().is_empty())
}

/// Formats a metric without trailing zeros (`20.0` renders as `20`).
pub fn format_metric(value: f64) -> String {
    format!("{value}")
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn format_number(number: &Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    if let Some(integer) = number.as_u64() {
        return integer.to_string();
    }
    number
        .as_f64()
        .map(format_metric)
        .unwrap_or_else(|| number.to_string())
}

/// Error type for wire model decoding.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON decoding failed.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
