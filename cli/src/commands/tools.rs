use seqbridge_core::envelope::Envelope;
use serde_json::{Map, Value};

use crate::util::{RequestBody, print_response, send_request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Search,
    Fetch,
}

impl Tool {
    fn arg_key(self) -> &'static str {
        match self {
            Tool::Search => "query",
            Tool::Fetch => "id",
        }
    }

    /// Structured calls go to `/mcp/*`; raw text goes to the legacy path.
    fn path(self, raw: bool) -> &'static str {
        match (self, raw) {
            (Tool::Search, false) => "/mcp/search",
            (Tool::Search, true) => "/search",
            (Tool::Fetch, false) => "/mcp/fetch",
            (Tool::Fetch, true) => "/fetch",
        }
    }
}

pub fn request_for(tool: Tool, value: &str, raw: bool) -> (&'static str, RequestBody) {
    let body = if raw {
        RequestBody::Text(value.to_string())
    } else {
        let mut args = Map::new();
        args.insert(tool.arg_key().to_string(), Value::String(value.to_string()));
        RequestBody::Json(Value::Object(args))
    };
    (tool.path(raw), body)
}

/// Successful envelopes print their decoded payload; anything else prints
/// as received.
pub fn display_body(body: Value) -> Value {
    serde_json::from_value::<Envelope>(body.clone())
        .ok()
        .and_then(|envelope| envelope.decoded())
        .unwrap_or(body)
}

pub async fn run(api_url: &str, tool: Tool, value: &str, raw: bool) -> i32 {
    let (path, body) = request_for(tool, value, raw);
    match send_request(api_url, reqwest::Method::POST, path, &[], Some(body)).await {
        Ok((status, body)) => {
            let shown = if status < 300 { display_body(body) } else { body };
            print_response(status, &shown)
        }
        Err(code) => code,
    }
}
