use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Connector hosts that call the tool endpoints from the browser.
const CONNECTOR_ORIGINS: &[&str] = &[
    "https://chatgpt.com",
    "https://chat.openai.com",
    "https://claude.ai",
];

/// Build the CORS layer from the configured origins plus the connector hosts.
///
/// - Methods: GET, POST, OPTIONS
/// - Headers: Authorization, Content-Type, x-admin
/// - Max age: 3600s
pub fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = merged_origins(configured)
        .into_iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-admin"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

fn merged_origins(configured: &[String]) -> Vec<String> {
    let mut origins: Vec<String> = configured
        .iter()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty() && s != "*")
        .collect();

    for connector_origin in CONNECTOR_ORIGINS {
        if !origins
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(connector_origin))
        {
            origins.push((*connector_origin).to_string());
        }
    }
    origins
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    #[test]
    fn connector_origins_are_always_present_once() {
        let origins = merged_origins(&[
            "https://ops.example.com/".to_string(),
            "HTTPS://CLAUDE.AI".to_string(),
        ]);
        assert_eq!(origins[0], "https://ops.example.com");
        assert_eq!(
            origins.iter().filter(|o| o.eq_ignore_ascii_case("https://claude.ai")).count(),
            1
        );
        assert!(origins.iter().any(|o| o == "https://chatgpt.com"));
    }

    #[test]
    fn wildcard_is_never_listed() {
        let origins = merged_origins(&["*".to_string()]);
        assert!(origins.iter().all(|o| o != "*"));
        // Building the layer must not panic either.
        let _ = build_cors_layer(&["*".to_string()]);
    }

    #[tokio::test]
    async fn preflight_allows_admin_header_for_known_origin() {
        let app = Router::new()
            .route("/rules/x/trigger", get(|| async { StatusCode::OK }))
            .layer(build_cors_layer(&[]));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/rules/x/trigger")
                    .header("origin", "https://claude.ai")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "x-admin")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "https://claude.ai");
        let allowed = headers["access-control-allow-headers"]
            .to_str()
            .expect("ascii header");
        assert!(allowed.contains("x-admin"));
    }
}
