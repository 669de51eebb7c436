use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use seqbridge_core::error::{ApiError, codes};

/// Middleware that enforces HTTPS via the `X-Forwarded-Proto` header.
///
/// Behind a TLS-terminating proxy, plain-HTTP reads are 301-redirected to the
/// HTTPS equivalent. Writes are refused outright so an admin token sent in
/// the clear is never acted on. All responses get an HSTS header.
pub async fn require_https(req: Request, next: Next) -> Response {
    let proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");

    if proto.eq_ignore_ascii_case("http") {
        let mut response = plain_http_response(&req);
        add_hsts_header(&mut response);
        return response;
    }

    let mut response = next.run(req).await;
    add_hsts_header(&mut response);
    response
}

fn plain_http_response(req: &Request) -> Response {
    if req.method() == Method::GET || req.method() == Method::HEAD {
        let host = req
            .headers()
            .get("host")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        if let Ok(uri) = format!("https://{host}{path_and_query}").parse::<Uri>() {
            return (StatusCode::MOVED_PERMANENTLY, [("location", uri.to_string())])
                .into_response();
        }
    }

    tracing::warn!(
        event = "plain_http_refused",
        method = %req.method(),
        path = %req.uri().path(),
        "Refused request over plain HTTP"
    );
    let body = ApiError {
        error: codes::FORBIDDEN.to_string(),
        message: "HTTPS required".to_string(),
        field: None,
        received: None,
        request_id: uuid::Uuid::now_v7().to_string(),
        docs_hint: Some("Resend the request over https://".to_string()),
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

fn add_hsts_header(response: &mut Response) {
    response.headers_mut().insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
}
