use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Map, Value, json};

use seqbridge_core::envelope::Envelope;
use seqbridge_core::payload::rebind_raw;

use crate::routes::tools::{ID_KEY, QUERY_KEY, run_fetch, run_search};
use crate::state::AppState;

const MCP_PATH: &str = "/mcp";
const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const MCP_SERVER_NAME: &str = "seqbridge";

pub fn router() -> Router<AppState> {
    Router::new().route(MCP_PATH, post(mcp_post).get(mcp_get))
}

async fn mcp_get() -> Response {
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

async fn mcp_post(State(state): State<AppState>, body: Bytes) -> Response {
    let incoming: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(error_response(Value::Null, RpcError::parse_error())),
            )
                .into_response();
        }
    };

    let responses = handle_incoming_message(&state, incoming).await;

    if responses.is_empty() {
        return StatusCode::ACCEPTED.into_response();
    }

    if responses.len() == 1 {
        return (
            StatusCode::OK,
            Json(responses.into_iter().next().unwrap_or(Value::Null)),
        )
            .into_response();
    }

    (StatusCode::OK, Json(Value::Array(responses))).into_response()
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "Parse error".to_string(),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
        }
    }
}

async fn handle_incoming_message(state: &AppState, incoming: Value) -> Vec<Value> {
    let mut responses = Vec::new();

    if let Some(batch) = incoming.as_array() {
        if batch.is_empty() {
            responses.push(error_response(
                Value::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            ));
            return responses;
        }
        for item in batch {
            if let Some(response) = handle_single_message(state, item).await {
                responses.push(response);
            }
        }
        return responses;
    }

    if let Some(response) = handle_single_message(state, &incoming).await {
        responses.push(response);
    }
    responses
}

async fn handle_single_message(state: &AppState, incoming: &Value) -> Option<Value> {
    let Some(obj) = incoming.as_object() else {
        return Some(error_response(
            Value::Null,
            RpcError::invalid_request("Request must be a JSON object"),
        ));
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        let id = obj.get("id").cloned().unwrap_or(Value::Null);
        return Some(error_response(
            id,
            RpcError::invalid_request("jsonrpc must be '2.0'"),
        ));
    }

    // Client responses carry no method; the server never issues requests.
    let method = obj.get("method").and_then(Value::as_str)?;

    let params = obj.get("params").cloned().unwrap_or(Value::Null);
    // Notifications (no id) get no reply.
    let id = obj.get("id").cloned()?;
    Some(match handle_request(state, method, params).await {
        Ok(payload) => success_response(id, payload),
        Err(err) => error_response(id, err),
    })
}

async fn handle_request(state: &AppState, method: &str, params: Value) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(initialize_payload()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(tools_list_payload()),
        "tools/call" => handle_tools_call(state, params).await,
        _ => Err(RpcError::method_not_found(method)),
    }
}

fn initialize_payload() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": MCP_SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": "Read-only access to Sequence accounts. Use search (query \"balances\" lists every account) and fetch with an account id or a rule id (ru_...)."
    })
}

fn tools_list_payload() -> Value {
    json!({
        "tools": [
            {
                "name": "search",
                "description": "Search Sequence accounts by name or id. Returns up to 10 results; \"balances\" or an empty query lists all accounts.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string", "description": "Free-text query"}
                    }
                }
            },
            {
                "name": "fetch",
                "description": "Fetch the full record for an account id, or a descriptor for a rule id starting with ru_.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string", "description": "Account or rule id"}
                    },
                    "required": ["id"]
                }
            }
        ]
    })
}

async fn handle_tools_call(state: &AppState, params: Value) -> Result<Value, RpcError> {
    let params = params
        .as_object()
        .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

    let args = match params.get("arguments") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(raw)) => {
            let mut map = Map::new();
            map.insert("raw".to_string(), Value::String(raw.clone()));
            map
        }
        Some(Value::Null) | None => Map::new(),
        Some(_) => {
            return Err(RpcError::invalid_params(
                "tools/call 'arguments' must be an object",
            ));
        }
    };

    let result = match name {
        "search" => run_search(state, &rebind_raw(args, QUERY_KEY)).await,
        "fetch" => run_fetch(state, &rebind_raw(args, ID_KEY)).await,
        other => {
            return Err(RpcError::invalid_params(format!("Unknown tool: {other}")));
        }
    };

    let envelope = match result {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::info!(
                event = "mcp_tool_error",
                tool = name,
                reason = %err.reason(),
                "MCP tool call failed"
            );
            Envelope::error(err.reason())
        }
    };

    serde_json::to_value(envelope).map_err(|e| RpcError::internal(e.to_string()))
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}
