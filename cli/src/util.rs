use serde_json::{Value, json};

pub const EXIT_OK: i32 = 0;
pub const EXIT_CLIENT_ERROR: i32 = 1;
pub const EXIT_SERVER_ERROR: i32 = 2;
pub const EXIT_CONNECTION_ERROR: i32 = 3;
pub const EXIT_USAGE_ERROR: i32 = 4;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

/// Pretty JSON, falling back to compact if pretty-printing ever fails.
pub fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Print a structured usage error and exit with the usage code.
pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", to_pretty(&err));
    std::process::exit(EXIT_USAGE_ERROR);
}

pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => EXIT_OK,
        400..=499 => EXIT_CLIENT_ERROR,
        _ => EXIT_SERVER_ERROR,
    }
}

pub fn parse_method(method: &str) -> Option<reqwest::Method> {
    match method.to_uppercase().as_str() {
        "GET" => Some(reqwest::Method::GET),
        "POST" => Some(reqwest::Method::POST),
        "PUT" => Some(reqwest::Method::PUT),
        "DELETE" => Some(reqwest::Method::DELETE),
        "PATCH" => Some(reqwest::Method::PATCH),
        "HEAD" => Some(reqwest::Method::HEAD),
        "OPTIONS" => Some(reqwest::Method::OPTIONS),
        _ => None,
    }
}

/// Request payload: JSON, or plain text for the gateway's raw-body form.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Text(String),
}

/// Send one request to the gateway.
///
/// Returns the status and body (non-JSON bodies are wrapped as
/// `{"raw": text}`), or the exit code to use when no response arrived.
pub async fn send_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    headers: &[(String, String)],
    body: Option<RequestBody>,
) -> Result<(u16, Value), i32> {
    let url = match reqwest::Url::parse(&format!("{}{path}", api_url.trim_end_matches('/'))) {
        Ok(u) => u,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Invalid URL: {api_url}{path}: {e}")
            });
            eprintln!("{}", to_pretty(&err));
            return Err(EXIT_USAGE_ERROR);
        }
    };

    let mut req = client().request(method, url);
    for (k, v) in headers {
        req = req.header(k.as_str(), v.as_str());
    }
    req = match body {
        Some(RequestBody::Json(value)) => req.json(&value),
        Some(RequestBody::Text(text)) => req.header("content-type", "text/plain").body(text),
        None => req,
    };

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the gateway running? Check --api-url or SEQBRIDGE_API_URL."
            });
            eprintln!("{}", to_pretty(&err));
            return Err(EXIT_CONNECTION_ERROR);
        }
    };

    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| json!({"raw": text}))
    };
    Ok((status, body))
}

/// Print a response (stdout on success, stderr otherwise) and return its
/// exit code.
pub fn print_response(status: u16, body: &Value) -> i32 {
    let exit_code = exit_code_for_status(status);
    let formatted = to_pretty(body);
    if exit_code == EXIT_OK {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }
    exit_code
}

/// Send a request, print the response, return the structured exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    headers: &[(String, String)],
    body: Option<RequestBody>,
) -> i32 {
    match send_request(api_url, method, path, headers, body).await {
        Ok((status, body)) => print_response(status, &body),
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_map_to_exit_codes() {
        assert_eq!(exit_code_for_status(200), 0);
        assert_eq!(exit_code_for_status(202), 0);
        assert_eq!(exit_code_for_status(401), 1);
        assert_eq!(exit_code_for_status(404), 1);
        assert_eq!(exit_code_for_status(500), 2);
        assert_eq!(exit_code_for_status(502), 2);
    }

    #[test]
    fn method_parsing_is_case_insensitive() {
        for m in ["get", "GET", "Get", "post", "DELETE", "put", "patch"] {
            assert!(parse_method(m).is_some(), "Failed to parse method: {m}");
        }
        assert!(parse_method("FETCH").is_none());
    }

    #[tokio::test]
    async fn unreachable_gateway_is_connection_error() {
        // Nothing listens on the discard port locally.
        let result =
            send_request("http://127.0.0.1:9", reqwest::Method::GET, "/health", &[], None).await;
        assert_eq!(result, Err(EXIT_CONNECTION_ERROR));
    }

    #[tokio::test]
    async fn malformed_base_url_is_usage_error() {
        let result = send_request("not a url", reqwest::Method::GET, "/health", &[], None).await;
        assert_eq!(result, Err(EXIT_USAGE_ERROR));
    }
}
