pub mod health;
pub mod mcp_http;
pub mod remote;
pub mod rules;
pub mod sse;
pub mod tools;

use axum::routing::get;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::ApiDoc;
use crate::middleware;
use crate::state::AppState;

/// Full application: every route plus the shared middleware stack.
pub fn app(state: AppState) -> Router {
    let require_https = state.config.require_https;
    let cors_layer = middleware::cors::build_cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api-doc/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(health::router())
        .merge(sse::router())
        .merge(tools::router())
        .merge(mcp_http::router())
        .merge(remote::router())
        .merge(rules::router())
        .layer(axum::middleware::from_fn(middleware::security_headers::apply))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(require_https.then(|| {
                    axum::middleware::from_fn(middleware::https::require_https)
                }))
                .layer(cors_layer),
        )
        .with_state(state)
}
