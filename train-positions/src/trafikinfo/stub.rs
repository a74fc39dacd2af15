//! Local stand-in for the Trafikinfo API, for tests.
//!
//! Serves one canned status and body for every POST and records what it
//! received so tests can check headers and the submitted query.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    reply: &'static str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// A running stub server bound to an ephemeral local port.
pub struct StubServer {
    url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    /// Start serving `reply` with `status` at `/v2/data.json`.
    pub async fn spawn(status: StatusCode, reply: &'static str) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            reply,
            captured: Arc::clone(&captured),
        };

        let app = Router::new()
            .route("/v2/data.json", post(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/v2/data.json"),
            captured,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<StubState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    state
        .captured
        .lock()
        .unwrap()
        .push(CapturedRequest { headers, body });
    (state.status, state.reply)
}
