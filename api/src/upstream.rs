use std::time::Duration;

use reqwest::StatusCode;
use seqbridge_core::accounts::{Account, accounts_from_body};
use seqbridge_core::auth::{BEARER_PREFIX, Secret};
use serde_json::{Value, json};
use thiserror::Error;

/// Per-call timeout for every upstream request. No retries on top of it.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);

const ACCESS_TOKEN_HEADER: &str = "x-sequence-access-token";
const SIGNATURE_HEADER: &str = "x-sequence-signature";
/// Upper bound on how much of an upstream error body ends up in logs
const LOGGED_BODY_MAX_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("SEQUENCE_ACCESS_TOKEN missing")]
    MissingCredential,
    #[error("Upstream returned {status}")]
    Status { status: StatusCode },
    #[error("Upstream request timed out")]
    Timeout,
    #[error("Upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Upstream returned a malformed body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(err)
        }
    }
}

/// Thin client for the two Sequence endpoints the gateway relays to.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Secret,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Secret,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// List every account visible to the access token, in upstream order.
    pub async fn fetch_accounts(&self) -> Result<Vec<Account>, UpstreamError> {
        if self.access_token.is_empty() {
            return Err(UpstreamError::MissingCredential);
        }
        let request = self.http.post(format!("{}/accounts", self.base_url)).header(
            ACCESS_TOKEN_HEADER,
            format!("{BEARER_PREFIX}{}", self.access_token.expose()),
        );
        let body = self.send_json(request, "accounts").await?;
        let accounts = accounts_from_body(body);
        tracing::debug!(
            event = "upstream_accounts_loaded",
            count = accounts.len(),
            "Loaded upstream accounts"
        );
        Ok(accounts)
    }

    /// Fire a remote-API rule, signed with that rule's own secret.
    /// The upstream JSON response is returned untouched.
    pub async fn trigger_rule(&self, rule_id: &str, secret: &Secret) -> Result<Value, UpstreamError> {
        let request = self
            .http
            .post(format!("{}/remote-api/rules/{rule_id}/trigger", self.base_url))
            .header(SIGNATURE_HEADER, format!("{BEARER_PREFIX}{}", secret.expose()));
        self.send_json(request, "rule_trigger").await
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<Value, UpstreamError> {
        let response = request.json(&json!({})).send().await.map_err(|err| {
            tracing::warn!(
                event = "upstream_request_failed",
                operation = operation,
                timeout = err.is_timeout(),
                error = %err,
                "Upstream request failed"
            );
            UpstreamError::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                event = "upstream_status_error",
                operation = operation,
                status = status.as_u16(),
                body = %truncate(&body, LOGGED_BODY_MAX_CHARS),
                "Upstream returned non-success status"
            );
            return Err(UpstreamError::Status { status });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::json;

    use super::*;
    use crate::test_support::{MockUpstream, spawn_router};

    #[tokio::test]
    async fn fetch_accounts_sends_access_token_and_parses_accounts() {
        let upstream = MockUpstream::start(json!({
            "data": {"accounts": [{"id": "acc_1", "name": "Checking"}]}
        }))
        .await;
        let client =
            UpstreamClient::new(&upstream.base_url, Secret::new("tok"), UPSTREAM_TIMEOUT).unwrap();

        let accounts = client.fetch_accounts().await.expect("accounts should load");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, "acc_1");

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/accounts");
        assert_eq!(calls[0].header(ACCESS_TOKEN_HEADER).as_deref(), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn missing_token_short_circuits_without_a_call() {
        let upstream = MockUpstream::start(json!({})).await;
        let client =
            UpstreamClient::new(&upstream.base_url, Secret::default(), UPSTREAM_TIMEOUT).unwrap();

        let err = client.fetch_accounts().await.unwrap_err();
        assert!(matches!(err, UpstreamError::MissingCredential));
        assert!(upstream.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_accounts_path_is_empty() {
        let upstream = MockUpstream::start(json!({"data": {"errors": ["provider down"]}})).await;
        let client =
            UpstreamClient::new(&upstream.base_url, Secret::new("tok"), UPSTREAM_TIMEOUT).unwrap();
        assert!(client.fetch_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let base_url = spawn_router(Router::new().route(
            "/accounts",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad token") }),
        ))
        .await;
        let client = UpstreamClient::new(&base_url, Secret::new("tok"), UPSTREAM_TIMEOUT).unwrap();

        match client.fetch_accounts().await.unwrap_err() {
            UpstreamError::Status { status } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let base_url =
            spawn_router(Router::new().route("/accounts", post(|| async { "<html>" }))).await;
        let client = UpstreamClient::new(&base_url, Secret::new("tok"), UPSTREAM_TIMEOUT).unwrap();

        assert!(matches!(
            client.fetch_accounts().await.unwrap_err(),
            UpstreamError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let base_url = spawn_router(Router::new().route(
            "/accounts",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        ))
        .await;
        let client =
            UpstreamClient::new(&base_url, Secret::new("tok"), Duration::from_millis(100)).unwrap();

        assert!(matches!(
            client.fetch_accounts().await.unwrap_err(),
            UpstreamError::Timeout
        ));
    }

    #[tokio::test]
    async fn trigger_signs_with_rule_secret_and_relays_body() {
        let upstream = MockUpstream::start(json!({})).await;
        let client =
            UpstreamClient::new(&upstream.base_url, Secret::new("tok"), UPSTREAM_TIMEOUT).unwrap();

        let body = client
            .trigger_rule("ru_7", &Secret::new("rule-secret"))
            .await
            .expect("trigger should succeed");
        assert_eq!(body, json!({"triggered": "ru_7"}));

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/remote-api/rules/ru_7/trigger");
        assert_eq!(
            calls[0].header(SIGNATURE_HEADER).as_deref(),
            Some("Bearer rule-secret")
        );
        assert_eq!(calls[0].header(ACCESS_TOKEN_HEADER), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
