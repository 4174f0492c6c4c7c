//! Mock implementations for testing
//!
//! In-process providers plus a stub Gemini HTTP endpoint.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Gated LLM Service (holds a single request open until released)
// ============================================================================

type Outcome = Result<LlmResponse, LlmError>;

/// Mock LLM service whose one call blocks until the test releases it
pub struct GatedLlmService {
    model_id: String,
    requests: Mutex<Vec<LlmRequest>>,
    release_tx: Mutex<Option<oneshot::Sender<Outcome>>>,
    release_rx: Mutex<Option<oneshot::Receiver<Outcome>>>,
    /// Notified when the request reaches the provider
    pub started: Notify,
}

impl GatedLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            release_tx: Mutex::new(Some(tx)),
            release_rx: Mutex::new(Some(rx)),
            started: Notify::new(),
        }
    }

    /// Let the pending call finish with `outcome`
    pub fn release(&self, outcome: Outcome) {
        if let Some(tx) = self.release_tx.lock().unwrap().take() {
            let _ = tx.send(outcome);
        }
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for GatedLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let rx = self.release_rx.lock().unwrap().take();
        self.started.notify_one();
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LlmError::network("Gate dropped"))),
            None => Err(LlmError::network("Gate already used")),
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Stub Gemini endpoint
// ============================================================================

/// A request received by the stub endpoint
#[derive(Debug, Clone)]
pub struct StubCall {
    /// Last path segment, e.g. `test-model:generateContent`
    pub model: String,
    /// `x-goog-api-key` header
    pub key: Option<String>,
    pub query: Option<String>,
    pub body: Value,
}

/// Canned `generateContent` endpoint that answers every call the same way
#[derive(Clone)]
pub struct StubProvider {
    status: StatusCode,
    body: Value,
    calls: Arc<Mutex<Vec<StubCall>>>,
}

impl StubProvider {
    pub fn replying(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn stub_generate(
    State(stub): State<StubProvider>,
    Path(model): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    stub.calls.lock().unwrap().push(StubCall {
        model,
        key,
        query,
        body,
    });
    (stub.status, Json(stub.body.clone()))
}

/// Serve `stub` on an ephemeral local port and return its base URL
pub async fn serve_stub(stub: StubProvider) -> String {
    let router = Router::new()
        .route("/v1beta/models/:model", post(stub_generate))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}
