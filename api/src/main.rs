use std::net::SocketAddr;

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod upstream;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seqbridge API",
        version = "0.1.0",
        description = "Connector gateway to the Sequence financial API: account search and fetch for AI clients, a sweep amount calculator, and admin-gated rule triggers."
    ),
    paths(
        routes::health::health_check,
        routes::sse::sse_stream,
        routes::tools::search_accounts,
        routes::tools::fetch_record,
        routes::remote::remote_amount,
        routes::rules::trigger_rule,
    ),
    components(schemas(
        HealthResponse,
        seqbridge_core::error::ApiError,
        seqbridge_core::envelope::Envelope,
        seqbridge_core::envelope::ContentItem,
        seqbridge_core::search::SearchResults,
        seqbridge_core::search::ResultItem,
        seqbridge_core::fetch::Document,
        seqbridge_core::sweep::AmountResponse,
        routes::tools::SearchRequest,
        routes::tools::FetchRequest,
        routes::remote::AmountRequest,
    )),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_token",
            utoipa::openapi::security::SecurityScheme::ApiKey(
                utoipa::openapi::security::ApiKey::Header(
                    utoipa::openapi::security::ApiKeyValue::new("x-admin"),
                ),
            ),
        );
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seqbridge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match config::GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(event = "config_invalid", error = %err, "Refusing to start");
            std::process::exit(1);
        }
    };

    if config.access_token.is_empty() {
        tracing::warn!(
            event = "config_missing",
            var = "SEQUENCE_ACCESS_TOKEN",
            "Search and fetch will answer 500 until the access token is set"
        );
    }
    if config.admin_token.is_empty() {
        tracing::warn!(
            event = "config_missing",
            var = "MCP_ADMIN_TOKEN",
            "Every rule trigger will be refused"
        );
    }
    tracing::info!(
        event = "config_loaded",
        whitelisted_rules = config.rule_secrets.len(),
        require_https = config.require_https,
        upstream = %config.upstream_base_url,
        "Configuration loaded"
    );

    let port = config.port;
    let app_state = match state::AppState::new(config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(event = "upstream_client_init_failed", error = %err, "Refusing to start");
            std::process::exit(1);
        }
    };

    let app = routes::app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(event = "bind_failed", %addr, error = %err, "Cannot bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("Seqbridge listening on {}", addr);

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(event = "server_error", error = %err, "Server exited with error");
        std::process::exit(1);
    }
    tracing::info!(event = "shutdown", "Seqbridge stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
