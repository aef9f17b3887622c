//! Shared fixtures for view state tests.

use vista_core::{Dataset, parse_dataset};
use vista_ui::ViewState;

/// Upload response used across rendering scenarios.
#[allow(dead_code)]
pub fn scenario_dataset() -> Dataset {
    parse_dataset(
        br#"{
            "total_count": 5,
            "averages": {"avg_flowrate": 1.2, "avg_pressure": 3.4, "avg_temp": 20},
            "raw_data": [{"Equipment Name": "Pump1", "Type": "Pump", "Flowrate": 1.2}]
        }"#,
    )
    .expect("scenario dataset should decode")
}

/// Drives a fresh state through a successful login.
#[allow(dead_code)]
pub fn logged_in(username: &str) -> ViewState {
    let mut state = ViewState::new();
    state.set_username(username);
    state.set_password("secret");
    state.begin_login().expect("login should start");
    assert!(state.login_succeeded(Some(username.to_string())));
    state
}

/// Drives a logged-in state through a successful upload.
#[allow(dead_code)]
pub fn with_dataset(dataset: Dataset) -> ViewState {
    let mut state = logged_in("a");
    assert!(state.begin_upload());
    assert!(state.upload_succeeded(dataset));
    state
}
