//! Integration tests for history refresh outcomes.

mod common;

use common::{Harness, TWO_ENTRY_HISTORY, json};
use vista_api::{Endpoint, TransportError};
use vista_ui::{EMPTY_HISTORY_MESSAGE, HistoryPanel, Phase, Screen};

#[tokio::test]
async fn dashboard_history_tests_empty_list_shows_placeholder_not_error() {
    let harness = Harness::new();
    harness.login_as("T1").await;

    let Screen::Dashboard(screen) = harness.dashboard.screen() else {
        panic!("expected dashboard");
    };
    assert_eq!(
        screen.history,
        HistoryPanel::Empty {
            message: EMPTY_HISTORY_MESSAGE
        }
    );
    assert_eq!(screen.error, None);
}

#[tokio::test]
async fn dashboard_history_tests_refresh_replaces_list_in_server_order() {
    let harness = Harness::new();
    harness.login_as("T1").await;
    harness
        .transport
        .push(Endpoint::History, json(200, TWO_ENTRY_HISTORY));

    harness.dashboard.refresh_history().await;

    let Screen::Dashboard(screen) = harness.dashboard.screen() else {
        panic!("expected dashboard");
    };
    let HistoryPanel::Entries(lines) = screen.history else {
        panic!("expected entries");
    };
    let names: Vec<&str> = lines.iter().map(|line| line.name.as_str()).collect();
    assert_eq!(names, vec!["b.csv", "a.csv"]);
    assert_eq!(lines[0].date, "Mar 02, 2025 10:15");
}

#[tokio::test]
async fn dashboard_history_tests_network_failure_is_silent_and_keeps_list() {
    let harness = Harness::new();
    harness.login_as("T1").await;
    harness
        .transport
        .push(Endpoint::History, json(200, TWO_ENTRY_HISTORY));
    harness.dashboard.refresh_history().await;

    harness.transport.push(
        Endpoint::History,
        Err(TransportError::Connect("connection reset".to_string())),
    );
    harness.dashboard.refresh_history().await;

    let state = harness.dashboard.snapshot();
    assert_eq!(state.history().len(), 2);
    assert_eq!(state.error(), None);
    assert_eq!(state.phase(), Phase::LoggedIn);
}

#[tokio::test]
async fn dashboard_history_tests_server_error_is_non_fatal() {
    let harness = Harness::new();
    harness.login_as("T1").await;
    harness.transport.push(Endpoint::History, json(500, "oops"));

    harness.dashboard.refresh_history().await;
    let state = harness.dashboard.snapshot();
    assert_eq!(state.phase(), Phase::LoggedIn);
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn dashboard_history_tests_unauthorized_forces_logout() {
    let harness = Harness::new();
    harness.login_as("T1").await;
    harness.transport.push(Endpoint::History, json(401, ""));

    harness.dashboard.refresh_history().await;

    let state = harness.dashboard.snapshot();
    assert_eq!(state.phase(), Phase::LoggedOut);
    assert_eq!(state.error(), Some("Session expired. Please login again."));
    assert_eq!(harness.stored_token(), None);
}

#[tokio::test]
async fn dashboard_history_tests_unauthorized_during_login_refetch_logs_out() {
    let harness = Harness::new();
    harness
        .transport
        .push(Endpoint::Login, json(200, r#"{"token":"T1"}"#));
    harness.transport.push(Endpoint::History, json(401, ""));
    harness.dashboard.set_username("a");
    harness.dashboard.set_password("b");

    harness.dashboard.submit_login().await;

    let state = harness.dashboard.snapshot();
    assert_eq!(state.phase(), Phase::LoggedOut);
    assert_eq!(state.error(), Some("Session expired. Please login again."));
}

#[tokio::test]
async fn dashboard_history_tests_skipped_without_token() {
    let harness = Harness::new();
    harness.dashboard.refresh_history().await;
    assert!(harness.transport.requests().is_empty());
}
