#![warn(missing_docs)]
//! # vista-ui
//!
//! ## Purpose
//! Defines the dashboard view state, its legal transitions, and a pure render
//! function from state to screen.
//!
//! ## Responsibilities
//! - Track the `{LoggedOut, Authenticating, LoggedIn, Uploading}` phase.
//! - Hold the credential form, current dataset, history, loading flag and
//!   error message.
//! - Refuse transitions that are illegal in the current phase.
//! - Project state into a framework-independent [`Screen`] and render it as
//!   text.
//!
//! ## Data flow
//! The view controller mutates [`ViewState`] on the start, success and
//! failure edges of each asynchronous operation; [`render`] then derives the
//! [`Screen`] shown to the user.
//!
//! ## Ownership and lifetimes
//! `ViewState` owns everything it displays. Screens are rebuilt from scratch
//! on each render and never borrow from state.
//!
//! ## Error model
//! This crate favours explicit state over recoverable errors. Transition
//! methods return `false`/`None` when a transition is not legal in the
//! current phase, leaving state untouched.
//!
//! ## Security and privacy notes
//! The password is masked in every rendering and wiped on successful login.
//! Tokens never enter view state.

mod render;
mod text;

pub use render::{
    BarChart, CHART_CATEGORIES, DashboardBody, DashboardScreen, DatasetView,
    EMPTY_DATASET_MESSAGE, EMPTY_HISTORY_MESSAGE, EMPTY_PREVIEW_MESSAGE, HistoryLine,
    HistoryPanel, LoginScreen, MetricCard, NO_DATE, PLACEHOLDER, PreviewTable, RenderOptions,
    Screen, UNKNOWN_NAME, format_history_date, render,
};

use vista_core::{Credentials, Dataset, HistoryEntry};

/// Shown when a login is submitted with a blank field.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Username and password are required";

/// Dashboard lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session; the credential form is shown.
    LoggedOut,
    /// Login request in flight.
    Authenticating,
    /// Session established; idle.
    LoggedIn,
    /// Upload request in flight.
    Uploading,
}

/// Aggregate dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    phase: Phase,
    credentials: Credentials,
    username: Option<String>,
    dataset: Option<Dataset>,
    history: Vec<HistoryEntry>,
    loading: bool,
    error: Option<String>,
}

impl ViewState {
    /// Creates a logged-out state with an empty form.
    pub fn new() -> Self {
        Self {
            phase: Phase::LoggedOut,
            credentials: Credentials::default(),
            username: None,
            dataset: None,
            history: Vec::new(),
            loading: false,
            error: None,
        }
    }

    /// Creates a logged-in state for a session restored from storage.
    pub fn restored() -> Self {
        Self {
            phase: Phase::LoggedIn,
            ..Self::new()
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Credential form contents.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Username reported by the backend at login, if known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Dataset from the latest successful upload.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Upload history in server order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Whether a request is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Message currently shown to the user.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` in `LoggedIn` and `Uploading`.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, Phase::LoggedIn | Phase::Uploading)
    }

    /// Returns `true` when an upload may start.
    pub fn can_upload(&self) -> bool {
        self.phase == Phase::LoggedIn && !self.loading
    }

    /// Returns `true` when the report export control is enabled.
    pub fn can_export_report(&self) -> bool {
        self.is_authenticated() && self.dataset.is_some()
    }

    /// Updates the username field of the credential form.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.credentials.username = username.into();
    }

    /// Updates the password field of the credential form.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
    }

    /// `LoggedOut -> Authenticating`.
    ///
    /// Returns the submitted credentials, or `None` when not logged out or a
    /// field is blank (the latter also sets an error message).
    pub fn begin_login(&mut self) -> Option<Credentials> {
        if self.phase != Phase::LoggedOut || self.loading {
            return None;
        }
        if self.credentials.is_incomplete() {
            self.error = Some(MISSING_CREDENTIALS_MESSAGE.to_string());
            return None;
        }

        self.phase = Phase::Authenticating;
        self.loading = true;
        self.error = None;
        Some(self.credentials.clone())
    }

    /// `Authenticating -> LoggedIn`. Wipes the credential form.
    pub fn login_succeeded(&mut self, username: Option<String>) -> bool {
        if self.phase != Phase::Authenticating {
            return false;
        }
        self.phase = Phase::LoggedIn;
        self.loading = false;
        self.error = None;
        self.credentials.clear();
        self.username = username;
        true
    }

    /// `Authenticating -> LoggedOut` with `message` shown.
    pub fn login_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != Phase::Authenticating {
            return false;
        }
        self.phase = Phase::LoggedOut;
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// `LoggedIn -> Uploading`. Refused while any request is in flight.
    pub fn begin_upload(&mut self) -> bool {
        if !self.can_upload() {
            return false;
        }
        self.phase = Phase::Uploading;
        self.loading = true;
        self.error = None;
        true
    }

    /// `Uploading -> LoggedIn` with the dataset replaced wholesale.
    pub fn upload_succeeded(&mut self, dataset: Dataset) -> bool {
        if self.phase != Phase::Uploading {
            return false;
        }
        self.phase = Phase::LoggedIn;
        self.loading = false;
        self.dataset = Some(dataset);
        true
    }

    /// `Uploading -> LoggedIn` with `message` shown and the prior dataset
    /// kept.
    pub fn upload_failed(&mut self, message: impl Into<String>) -> bool {
        if self.phase != Phase::Uploading {
            return false;
        }
        self.phase = Phase::LoggedIn;
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Replaces the history list wholesale. Ignored when logged out.
    pub fn history_loaded(&mut self, entries: Vec<HistoryEntry>) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.history = entries;
        true
    }

    /// Sets a message without changing phase.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Any phase `-> LoggedOut`, clearing everything and showing `message`.
    pub fn force_logout(&mut self, message: impl Into<String>) {
        *self = Self::new();
        self.error = Some(message.into());
    }

    /// Any phase `-> LoggedOut`, clearing everything including the message.
    pub fn logged_out(&mut self) {
        *self = Self::new();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
