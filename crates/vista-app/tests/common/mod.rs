//! Shared fakes and fixtures for dashboard integration tests.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use vista_api::{
    ApiConfig, ApiGateway, ApiRequest, ApiResponse, ApiTransport, DEFAULT_API_BASE, Endpoint,
    TransportError,
};
use vista_app::{Dashboard, ReportError, ReportSink};
use vista_session::{MemoryTokenStore, SessionManager, TOKEN_KEY, TokenStore};
use vista_ui::RenderOptions;

/// Successful upload body from the reference scenario.
#[allow(dead_code)]
pub const SCENARIO_UPLOAD: &str = r#"{
    "total_count": 5,
    "averages": {"avg_flowrate": 1.2, "avg_pressure": 3.4, "avg_temp": 20},
    "distribution": {"Pump": 1},
    "raw_data": [{"Equipment Name": "Pump1", "Type": "Pump", "Flowrate": 1.2}]
}"#;

/// Two-entry history body.
#[allow(dead_code)]
pub const TWO_ENTRY_HISTORY: &str = r#"[
    {"id": 2, "name": "b.csv", "date": "2025-03-02T10:15:00+00:00"},
    {"id": 1, "name": "a.csv", "date": "2025-03-01T08:00:00+00:00"}
]"#;

/// Scripted outcome for one request.
#[allow(dead_code)]
pub enum Step {
    /// Answer immediately.
    Ready(Result<ApiResponse, TransportError>),
    /// Answer once the test releases the paired sender.
    Held(oneshot::Receiver<Result<ApiResponse, TransportError>>),
}

/// Transport replaying per-endpoint scripts and recording every request.
///
/// An endpoint with no script left answers with a connect failure.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<Endpoint, VecDeque<Step>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues an immediate answer for `endpoint`.
    pub fn push(&self, endpoint: Endpoint, outcome: Result<ApiResponse, TransportError>) {
        self.push_step(endpoint, Step::Ready(outcome));
    }

    /// Queues an answer for `endpoint` that waits for the returned sender.
    pub fn hold(
        &self,
        endpoint: Endpoint,
    ) -> oneshot::Sender<Result<ApiResponse, TransportError>> {
        let (release, held) = oneshot::channel();
        self.push_step(endpoint, Step::Held(held));
        release
    }

    fn push_step(&self, endpoint: Endpoint, step: Step) {
        self.scripts
            .lock()
            .expect("script lock")
            .entry(endpoint)
            .or_default()
            .push_back(step);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("request log lock").clone()
    }

    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.endpoint == endpoint)
            .collect()
    }

    /// Yields until `count` requests to `endpoint` were recorded.
    pub async fn wait_for(&self, endpoint: Endpoint, count: usize) {
        while self.requests_to(endpoint).len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let endpoint = request.endpoint;
        self.requests.lock().expect("request log lock").push(request);
        let step = self
            .scripts
            .lock()
            .expect("script lock")
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);

        match step {
            Some(Step::Ready(outcome)) => outcome,
            Some(Step::Held(held)) => held
                .await
                .unwrap_or_else(|_| Err(TransportError::Connect("held step dropped".to_string()))),
            None => Err(TransportError::Connect("no scripted response".to_string())),
        }
    }
}

/// In-memory report sink.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryReportSink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

#[allow(dead_code)]
impl MemoryReportSink {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().expect("sink lock").clone()
    }
}

impl ReportSink for MemoryReportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        if self.fail {
            return Err(ReportError::Io(std::io::Error::other("disk full")));
        }
        self.saved
            .lock()
            .expect("sink lock")
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// Dashboard wired to fakes, with handles to inspect them.
#[allow(dead_code)]
pub struct Harness {
    pub dashboard: Dashboard,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryTokenStore>,
    pub reports: Arc<MemoryReportSink>,
}

#[allow(dead_code)]
impl Harness {
    /// Harness with an empty token store.
    pub fn new() -> Self {
        Self::with_store(MemoryTokenStore::new())
    }

    /// Harness whose store already holds `token`.
    pub fn restored(token: &str) -> Self {
        Self::with_store(MemoryTokenStore::with_entry(TOKEN_KEY, token))
    }

    /// Harness saving reports into `reports`.
    pub fn with_reports(reports: MemoryReportSink) -> Self {
        Self::build(MemoryTokenStore::new(), reports)
    }

    fn with_store(store: MemoryTokenStore) -> Self {
        Self::build(store, MemoryReportSink::default())
    }

    fn build(store: MemoryTokenStore, reports: MemoryReportSink) -> Self {
        let transport = ScriptedTransport::new();
        let store = Arc::new(store);
        let reports = Arc::new(reports);
        let config = ApiConfig::new(DEFAULT_API_BASE).expect("default base should be valid");
        let dashboard = Dashboard::new(
            SessionManager::new(store.clone()),
            ApiGateway::new(config, transport.clone()),
            reports.clone(),
            RenderOptions::default(),
        );
        Self {
            dashboard,
            transport,
            store,
            reports,
        }
    }

    /// Token currently persisted.
    pub fn stored_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).expect("memory store read")
    }

    /// Logs in as `a`/`b` with the backend granting `token` and an empty
    /// history.
    pub async fn login_as(&self, token: &str) {
        self.transport.push(
            Endpoint::Login,
            json(200, &format!(r#"{{"token":"{token}","username":"a"}}"#)),
        );
        self.transport.push(Endpoint::History, json(200, "[]"));
        self.dashboard.set_username("a");
        self.dashboard.set_password("b");
        assert!(self.dashboard.submit_login().await, "login should succeed");
    }

    /// Logs in and applies the reference upload.
    pub async fn login_and_upload(&self, token: &str) {
        self.login_as(token).await;
        self.transport.push(Endpoint::Upload, json(201, SCENARIO_UPLOAD));
        self.transport.push(Endpoint::History, json(200, TWO_ENTRY_HISTORY));
        assert!(
            self.dashboard.upload("plant.csv", csv_bytes()).await,
            "upload should apply"
        );
    }
}

/// JSON response helper.
#[allow(dead_code)]
pub fn json(status: u16, body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(status, body.as_bytes().to_vec()))
}

/// Small CSV file body.
#[allow(dead_code)]
pub fn csv_bytes() -> Vec<u8> {
    b"Equipment Name,Type,Flowrate,Pressure,Temperature\nPump1,Pump,1.2,3.4,20\n".to_vec()
}
