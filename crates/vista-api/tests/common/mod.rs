//! Shared fakes for gateway integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vista_api::{
    ApiConfig, ApiGateway, ApiRequest, ApiResponse, ApiTransport, DEFAULT_API_BASE,
    TransportError,
};

/// Transport that replays scripted outcomes and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(outcomes: Vec<Result<ApiResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().expect("request log lock").push(request);
        self.outcomes
            .lock()
            .expect("outcome lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted response".to_string())))
    }
}

/// Builds a gateway against the default local base URL.
#[allow(dead_code)]
pub fn gateway(transport: Arc<ScriptedTransport>) -> ApiGateway {
    let config = ApiConfig::new(DEFAULT_API_BASE).expect("default base should be valid");
    ApiGateway::new(config, transport)
}

/// JSON response helper.
#[allow(dead_code)]
pub fn json(status: u16, body: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(status, body.as_bytes().to_vec()))
}
