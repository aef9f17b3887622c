//! Dashboard controller: binds session, gateway and report sink to the view
//! state machine.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vista_api::{ApiError, ApiGateway, REPORT_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE};
use vista_session::{SessionManager, SessionTicket};
use vista_ui::{RenderOptions, Screen, ViewState, render};

use crate::redact_sensitive;
use crate::report::{ReportSink, report_file_name};

/// Shown when an authorized action finds no token.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";

/// Shown when a granted token cannot be persisted.
pub const SESSION_STORE_FAILURE_MESSAGE: &str = "Unable to save session";

/// Owns the view state and runs every user action against it.
///
/// All methods take `&self`; the view state sits behind a mutex that is never
/// held across an `.await`. Each asynchronous action records the session
/// ticket it started in and drops its outcome when a login or logout happened
/// meanwhile.
pub struct Dashboard {
    state: Mutex<ViewState>,
    session: SessionManager,
    gateway: ApiGateway,
    reports: Arc<dyn ReportSink>,
    options: RenderOptions,
}

impl Dashboard {
    /// Creates a controller. A token restored by `session` starts it in
    /// `LoggedIn`.
    pub fn new(
        session: SessionManager,
        gateway: ApiGateway,
        reports: Arc<dyn ReportSink>,
        options: RenderOptions,
    ) -> Self {
        let state = if session.is_authenticated() {
            ViewState::restored()
        } else {
            ViewState::new()
        };
        Self {
            state: Mutex::new(state),
            session,
            gateway,
            reports,
            options,
        }
    }

    /// Runs the entry side effect for a restored session.
    pub async fn start(&self) {
        let restored = self.session.is_authenticated();
        info!(stage = "bootstrap", action = "session_restore", restored);
        if restored {
            self.refresh_history().await;
        }
    }

    /// Session manager in use.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    /// Renders the current view state.
    pub fn screen(&self) -> Screen {
        render(&self.state(), &self.options)
    }

    /// Updates the username field.
    pub fn set_username(&self, username: impl Into<String>) {
        self.state().set_username(username);
    }

    /// Updates the password field.
    pub fn set_password(&self, password: impl Into<String>) {
        self.state().set_password(password);
    }

    /// Shows `message` without changing phase.
    pub fn show_error(&self, message: impl Into<String>) {
        self.state().show_error(message);
    }

    /// Submits the credential form.
    ///
    /// On success the token is persisted, the form is wiped and history is
    /// fetched once. Returns `true` when the dashboard ends up logged in by
    /// this call.
    pub async fn submit_login(&self) -> bool {
        let Some(credentials) = self.state().begin_login() else {
            debug!(stage = "auth", action = "login_refused");
            return false;
        };
        let ticket = self.session.ticket();
        info!(
            stage = "auth",
            action = "login_attempt",
            username_len = credentials.username.chars().count(),
        );

        let outcome = self.gateway.login(&credentials).await;
        drop(credentials);
        if self.is_stale(ticket, "auth") {
            return false;
        }

        let grant = match outcome {
            Ok(grant) => grant,
            Err(error) => {
                warn!(
                    stage = "auth",
                    action = "login_failed",
                    error = %redact_sensitive(&error.to_string()),
                );
                self.state().login_failed(error.user_message());
                return false;
            }
        };

        if let Err(error) = self.session.login(&grant.token) {
            warn!(stage = "auth", action = "token_persist_failed", %error);
            self.state().login_failed(SESSION_STORE_FAILURE_MESSAGE);
            return false;
        }
        self.state().login_succeeded(grant.username);
        info!(stage = "auth", action = "login_success");

        self.refresh_history().await;
        true
    }

    /// Uploads `bytes` as `file_name`.
    ///
    /// Refused while another request is in flight. On success the dataset is
    /// replaced and history is refetched exactly once; on a validation
    /// failure the prior dataset stays. Returns `true` when the upload was
    /// applied.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> bool {
        if !self.state().begin_upload() {
            debug!(stage = "upload", action = "upload_refused");
            return false;
        }
        let Some(token) = self.session.token() else {
            warn!(stage = "upload", action = "missing_token");
            self.session.clear();
            self.state().force_logout(NOT_AUTHENTICATED_MESSAGE);
            return false;
        };
        let ticket = self.session.ticket();

        let outcome = self.gateway.upload_file(&token, file_name, bytes).await;
        if self.is_stale(ticket, "upload") {
            return false;
        }

        match outcome {
            Ok(dataset) => {
                info!(
                    stage = "upload",
                    action = "upload_success",
                    rows = dataset.raw_data.len(),
                );
                self.state().upload_succeeded(dataset);
                self.refresh_history().await;
                true
            }
            Err(ApiError::SessionExpired) => {
                self.expire("upload");
                false
            }
            Err(error) => {
                warn!(
                    stage = "upload",
                    action = "upload_failed",
                    error = %redact_sensitive(&error.to_string()),
                );
                self.state().upload_failed(error.user_message());
                false
            }
        }
    }

    /// Refetches upload history and replaces the list wholesale.
    ///
    /// A 401 forces logout; any other failure is logged and leaves history
    /// unchanged.
    pub async fn refresh_history(&self) {
        let Some(token) = self.session.token() else {
            debug!(stage = "history", action = "skipped_without_token");
            return;
        };
        let ticket = self.session.ticket();

        let outcome = self.gateway.fetch_history(&token).await;
        if self.is_stale(ticket, "history") {
            return;
        }

        match outcome {
            Ok(entries) => {
                debug!(stage = "history", action = "history_loaded", entries = entries.len());
                self.state().history_loaded(entries);
            }
            Err(ApiError::SessionExpired) => self.expire("history"),
            Err(error) => warn!(
                stage = "history",
                action = "history_failed",
                error = %redact_sensitive(&error.to_string()),
            ),
        }
    }

    /// Downloads the report for the loaded dataset and saves it as
    /// `VISTA_Report_<unix-millis>.pdf` stamped with `now`.
    ///
    /// A no-op returning `None` unless a dataset is loaded.
    pub async fn export_report(&self, now: OffsetDateTime) -> Option<PathBuf> {
        if !self.state().can_export_report() {
            debug!(stage = "report", action = "export_disabled");
            return None;
        }
        let Some(token) = self.session.token() else {
            warn!(stage = "report", action = "missing_token");
            self.show_error(NOT_AUTHENTICATED_MESSAGE);
            return None;
        };
        let ticket = self.session.ticket();

        let outcome = self.gateway.download_report(&token).await;
        if self.is_stale(ticket, "report") {
            return None;
        }

        let bytes = match outcome {
            Ok(bytes) => bytes,
            Err(ApiError::SessionExpired) => {
                self.expire("report");
                return None;
            }
            Err(error) => {
                warn!(
                    stage = "report",
                    action = "download_failed",
                    error = %redact_sensitive(&error.to_string()),
                );
                self.show_error(error.user_message());
                return None;
            }
        };

        let file_name = report_file_name(now);
        match self.reports.save(&file_name, &bytes) {
            Ok(path) => {
                info!(
                    stage = "report",
                    action = "report_saved",
                    size_bytes = bytes.len(),
                    path = %path.display(),
                );
                Some(path)
            }
            Err(error) => {
                warn!(stage = "report", action = "save_failed", %error);
                self.show_error(REPORT_FAILURE_MESSAGE);
                None
            }
        }
    }

    /// Ends the session locally and notifies the backend in the background.
    ///
    /// Idempotent. The returned handle, present only when a token was held,
    /// resolves once the best-effort notification finished; dropping it does
    /// not cancel the notification.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let token = self.session.clear();
        self.state().logged_out();
        info!(stage = "session", action = "logout", had_token = token.is_some());

        let token = token?;
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(error) => {
                warn!(stage = "session", action = "logout_notify_skipped", %error);
                return None;
            }
        };
        let gateway = self.gateway.clone();
        Some(runtime.spawn(async move {
            if let Err(error) = gateway.logout(&token).await {
                warn!(
                    stage = "session",
                    action = "logout_notify_failed",
                    error = %redact_sensitive(&error.to_string()),
                );
            }
        }))
    }

    fn expire(&self, stage: &'static str) {
        warn!(stage, action = "session_expired");
        self.session.clear();
        self.state().force_logout(SESSION_EXPIRED_MESSAGE);
    }

    fn is_stale(&self, ticket: SessionTicket, stage: &'static str) -> bool {
        let stale = !self.session.is_current(ticket);
        if stale {
            debug!(stage, action = "stale_response_dropped", epoch = ticket.epoch());
        }
        stale
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
