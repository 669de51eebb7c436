use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use seqbridge_core::error::ApiError;
use seqbridge_core::sweep::{AmountResponse, parse_checking_balance};

use crate::error::AppError;
use crate::extract::Payload;
use crate::state::AppState;

const BALANCE_KEY: &str = "checkingBalance";

pub fn router() -> Router<AppState> {
    Router::new().route("/remote/amount", post(remote_amount))
}

/// Body posted by Sequence's "Query Remote API" action.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AmountRequest {
    /// Current checking balance in dollars (number or numeric string)
    #[serde(rename = "checkingBalance")]
    pub checking_balance: Option<f64>,
}

/// Compute the sweep transfer amount
///
/// Moves `percent` of the balance above the buffer, capped per day.
/// Pure calculation; no upstream call.
#[utoipa::path(
    post,
    path = "/remote/amount",
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Transfer amount in cents", body = AmountResponse),
        (status = 400, description = "checkingBalance is not numeric", body = ApiError)
    ),
    tag = "remote"
)]
pub async fn remote_amount(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<Json<AmountResponse>, AppError> {
    let args = body.into_args(BALANCE_KEY)?;
    let balance = parse_checking_balance(args.get(BALANCE_KEY))?;
    let amount = state.config.sweep.compute_amount(balance);
    tracing::info!(
        event = "remote_amount",
        amount_in_cents = amount.amount_in_cents,
        "Sweep amount computed"
    );
    Ok(Json(amount))
}
