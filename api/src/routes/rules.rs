use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use seqbridge_core::auth::authorize_trigger;
use seqbridge_core::error::ApiError;

use crate::error::AppError;
use crate::state::AppState;

const ADMIN_HEADER: &str = "x-admin";

pub fn router() -> Router<AppState> {
    Router::new().route("/rules/{rule_id}/trigger", post(trigger_rule))
}

/// Trigger a whitelisted Sequence rule
///
/// Requires `x-admin: Bearer <admin token>`. The upstream call is signed
/// with the rule's own secret, and its JSON response is relayed unchanged.
#[utoipa::path(
    post,
    path = "/rules/{rule_id}/trigger",
    params(
        ("rule_id" = String, Path, description = "Sequence rule id (e.g. 'ru_123')")
    ),
    responses(
        (status = 200, description = "Upstream trigger response, verbatim"),
        (status = 401, description = "Missing or malformed x-admin header", body = ApiError),
        (status = 403, description = "Wrong admin token, or rule not whitelisted", body = ApiError),
        (status = 502, description = "Upstream failure", body = ApiError)
    ),
    security(("admin_token" = [])),
    tag = "rules"
)]
pub async fn trigger_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let admin_header = headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok());

    let secret = match authorize_trigger(
        admin_header,
        &state.config.admin_token,
        &state.config.rule_secrets,
        &rule_id,
    ) {
        Ok(secret) => secret,
        Err(err) => {
            tracing::warn!(
                event = "rule_trigger_authorization",
                rule_id = %rule_id,
                decision = "deny",
                reason = %err,
                "Rule trigger refused"
            );
            return Err(err.into());
        }
    };

    tracing::info!(
        event = "rule_trigger_authorization",
        rule_id = %rule_id,
        decision = "allow",
        "Rule trigger authorized"
    );

    let response = state.upstream.trigger_rule(&rule_id, secret).await?;
    Ok(Json(response))
}
