use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use seqbridge_core::envelope::Envelope;
use seqbridge_core::error::ApiError;
use seqbridge_core::payload::string_arg;
use seqbridge_core::{fetch, search};

use crate::error::AppError;
use crate::extract::Payload;
use crate::state::AppState;

pub const QUERY_KEY: &str = "query";
pub const ID_KEY: &str = "id";

/// `/mcp/*` is the structured tool-call shape; the bare paths are the
/// legacy wrappers. Both accept either body form.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mcp/search", post(search_accounts))
        .route("/search", post(search_accounts))
        .route("/mcp/fetch", post(fetch_record))
        .route("/fetch", post(fetch_record))
}

/// Search request body. A bare string body is treated as the query.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SearchRequest {
    /// Free text matched against account names and ids; "balances" or
    /// "accounts" (or empty) lists everything
    pub query: Option<String>,
}

/// Fetch request body. A bare string body is treated as the id.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct FetchRequest {
    /// Account id, or a rule id starting with `ru_`
    pub id: String,
}

/// Search accounts
///
/// Also served at `POST /search`. The envelope text decodes to
/// `{"results": [{id, title, url}]}` with at most 10 entries.
#[utoipa::path(
    post,
    path = "/mcp/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching accounts", body = Envelope),
        (status = 500, description = "Access token not configured", body = ApiError),
        (status = 502, description = "Upstream failure", body = ApiError)
    ),
    tag = "tools"
)]
pub async fn search_accounts(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Json<Envelope>, AppError> {
    let args = body.into_args(QUERY_KEY)?;
    Ok(Json(run_search(&state, &args).await?))
}

/// Fetch one account or rule
///
/// Also served at `POST /fetch`. Account ids win over the `ru_` rule prefix.
#[utoipa::path(
    post,
    path = "/mcp/fetch",
    request_body = FetchRequest,
    responses(
        (status = 200, description = "Account record or rule descriptor", body = Envelope),
        (status = 404, description = "No account or rule matched", body = ApiError),
        (status = 500, description = "Access token not configured", body = ApiError)
    ),
    tag = "tools"
)]
pub async fn fetch_record(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Json<Envelope>, AppError> {
    let args = body.into_args(ID_KEY)?;
    Ok(Json(run_fetch(&state, &args).await?))
}

pub(crate) async fn run_search(
    state: &AppState,
    args: &Map<String, Value>,
) -> Result<Envelope, AppError> {
    let query = string_arg(args, QUERY_KEY);
    let accounts = state.upstream.fetch_accounts().await?;
    let results = search::search(&accounts, &query, &state.config.app_base_url);
    tracing::info!(
        event = "tool_search",
        query_len = query.len(),
        accounts = accounts.len(),
        results = results.results.len(),
        "Search served"
    );
    Ok(Envelope::json(&results)?)
}

pub(crate) async fn run_fetch(
    state: &AppState,
    args: &Map<String, Value>,
) -> Result<Envelope, AppError> {
    let id = string_arg(args, ID_KEY);
    let accounts = state.upstream.fetch_accounts().await?;
    match fetch::resolve(&accounts, &id, &state.config.app_base_url) {
        Some(document) => {
            tracing::info!(event = "tool_fetch", id = %document.id, "Fetch served");
            Ok(Envelope::json(&document)?)
        }
        None => {
            tracing::info!(event = "tool_fetch_miss", id = %id.trim(), "Fetch found nothing");
            Err(AppError::NotFound {
                resource: id.trim().to_string(),
            })
        }
    }
}
