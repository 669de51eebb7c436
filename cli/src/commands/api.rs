use clap::Args;

use crate::util::{RequestBody, api_request, exit_error, parse_method};

#[derive(Args)]
pub struct ApiArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    pub method: String,

    /// Gateway path (e.g. /mcp/search)
    pub path: String,

    /// Request body as JSON string
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Extra headers (repeatable: Key:Value)
    #[arg(long, short = 'H')]
    pub header: Vec<String>,
}

pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (k, v) = raw.split_once(':')?;
    let k = k.trim();
    if k.is_empty() {
        return None;
    }
    Some((k.to_string(), v.trim().to_string()))
}

pub async fn run(api_url: &str, args: ApiArgs) -> i32 {
    let method = match parse_method(&args.method) {
        Some(m) => m,
        None => exit_error(
            &format!("Unknown HTTP method: {}", args.method),
            Some("Supported methods: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS"),
        ),
    };

    if !args.path.starts_with('/') {
        exit_error(
            &format!("Path must start with '/': {}", args.path),
            Some("e.g. seqbridge api GET /health"),
        );
    }

    let mut headers = Vec::new();
    for h in &args.header {
        match parse_header(h) {
            Some(pair) => headers.push(pair),
            None => exit_error(
                &format!("Invalid header: '{h}'"),
                Some("Format: Key:Value, e.g. --header x-admin:Bearer <token>"),
            ),
        }
    }

    let body = match args.data.as_deref().map(serde_json::from_str) {
        Some(Ok(v)) => Some(RequestBody::Json(v)),
        Some(Err(e)) => exit_error(
            &format!("Invalid JSON in --data: {e}"),
            Some("Provide valid JSON string"),
        ),
        None => None,
    };

    api_request(api_url, method, &args.path, &headers, body).await
}
