//! Shared fixtures for handler and client tests: an in-process fake of the
//! Sequence API and helpers to drive the gateway router.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::GatewayConfig;
use crate::state::AppState;

pub const ADMIN_TOKEN: &str = "admin-test-token";
pub const RULE_ID: &str = "ru_listed";
pub const RULE_SECRET: &str = "rule-listed-secret";

/// One request received by the fake upstream.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub headers: HeaderMap,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    }
}

#[derive(Clone)]
struct MockState {
    accounts_body: Value,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Fake Sequence API: `/accounts` returns a fixed body and rule triggers
/// echo the rule id. Every call is recorded.
pub struct MockUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockUpstream {
    pub async fn start(accounts_body: Value) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            accounts_body,
            calls: calls.clone(),
        };
        let router = Router::new()
            .route("/accounts", post(mock_accounts))
            .route("/remote-api/rules/{rule_id}/trigger", post(mock_trigger))
            .with_state(state);
        let base_url = spawn_router(router).await;
        Self { base_url, calls }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

async fn mock_accounts(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    record(&state, "/accounts".to_string(), headers);
    Json(state.accounts_body.clone())
}

async fn mock_trigger(
    State(state): State<MockState>,
    Path(rule_id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&state, format!("/remote-api/rules/{rule_id}/trigger"), headers);
    Json(json!({"triggered": rule_id}))
}

fn record(state: &MockState, path: String, headers: HeaderMap) {
    state
        .calls
        .lock()
        .expect("calls lock poisoned")
        .push(RecordedCall { path, headers });
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server crashed");
    });
    format!("http://{addr}")
}

/// Three accounts in a fixed upstream order, one without a balance.
pub fn sample_accounts() -> Value {
    json!({
        "data": {
            "accounts": [
                {"id": "acc_chk", "name": "Main Checking", "balance": {"amountInDollars": 2450.75}},
                {"id": "acc_sav", "name": "Rainy Day Savings", "balance": {"amountInDollars": 10000}},
                {"id": "acc_err", "name": "Broken Link", "balance": null}
            ]
        }
    })
}

/// Config pointing at `upstream_base_url`, with extra variables applied on top.
pub fn test_config(upstream_base_url: &str, overrides: &[(&str, &str)]) -> GatewayConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("SEQUENCE_ACCESS_TOKEN".to_string(), "access-test-token".to_string()),
        ("MCP_ADMIN_TOKEN".to_string(), ADMIN_TOKEN.to_string()),
        (
            "SEQUENCE_RULE_SECRETS_JSON".to_string(),
            json!({ RULE_ID: RULE_SECRET }).to_string(),
        ),
        ("SEQUENCE_API_URL".to_string(), upstream_base_url.to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    GatewayConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config should load")
}

pub fn test_state(upstream_base_url: &str, overrides: &[(&str, &str)]) -> AppState {
    AppState::new(test_config(upstream_base_url, overrides)).expect("state should build")
}

/// Send one request through the full application router and decode the body
/// as JSON (`Value::Null` when the body is empty or not JSON).
pub async fn send(state: AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = crate::routes::app(state)
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

pub fn post_raw(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(body.into())
        .expect("request should build")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Decode the JSON document carried in an envelope's single text item.
pub fn envelope_payload(envelope: &Value) -> Value {
    let content = envelope["content"]
        .as_array()
        .expect("envelope should have content");
    assert_eq!(content.len(), 1, "envelope must carry exactly one item");
    assert_eq!(content[0]["type"], "text");
    serde_json::from_str(content[0]["text"].as_str().expect("text should be a string"))
        .expect("text should be JSON")
}
