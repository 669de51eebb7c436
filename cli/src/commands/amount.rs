use serde_json::json;

use crate::util::{RequestBody, api_request};

pub async fn run(api_url: &str, checking_balance: f64) -> i32 {
    api_request(
        api_url,
        reqwest::Method::POST,
        "/remote/amount",
        &[],
        Some(RequestBody::Json(json!({ "checkingBalance": checking_balance }))),
    )
    .await
}
