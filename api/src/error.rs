use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use seqbridge_core::auth::TriggerAuthError;
use seqbridge_core::error::{self, ApiError};
use seqbridge_core::payload::PayloadError;
use seqbridge_core::sweep::BalanceError;

use crate::upstream::UpstreamError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// No account or rule matched (404)
    NotFound { resource: String },
    /// Missing or malformed credential header (401)
    Unauthorized {
        message: String,
        docs_hint: Option<String>,
    },
    /// Credential present but not allowed (403)
    Forbidden {
        message: String,
        docs_hint: Option<String>,
    },
    /// Deployment lacks a required credential (500)
    ConfigMissing { message: String },
    /// Upstream call failed (upstream status, 502 or 504)
    Upstream(UpstreamError),
    /// Internal error (500)
    Internal(String),
}

impl AppError {
    /// Short human-readable reason, also used for MCP tool error results.
    pub fn reason(&self) -> String {
        match self {
            AppError::Validation { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::ConfigMissing { message } => message.clone(),
            AppError::NotFound { .. } => "Not found".to_string(),
            AppError::Upstream(err) => err.to_string(),
            AppError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::ConfigMissing { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream(UpstreamError::Status { status })
                if status.is_client_error() || status.is_server_error() =>
            {
                *status
            }
            AppError::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        let status = self.status();
        let message = self.reason();

        let api_error = match self {
            AppError::Validation {
                field,
                received,
                docs_hint,
                ..
            } => ApiError {
                error: error::codes::VALIDATION_FAILED.to_string(),
                message,
                field,
                received,
                request_id,
                docs_hint,
            },
            AppError::NotFound { resource } => ApiError {
                error: error::codes::NOT_FOUND.to_string(),
                message,
                field: None,
                received: Some(serde_json::Value::String(resource)),
                request_id,
                docs_hint: Some(
                    "Use search to list account ids; rule ids start with 'ru_'.".to_string(),
                ),
            },
            AppError::Unauthorized { docs_hint, .. } => ApiError {
                error: error::codes::UNAUTHORIZED.to_string(),
                message,
                field: None,
                received: None,
                request_id,
                docs_hint,
            },
            AppError::Forbidden { docs_hint, .. } => ApiError {
                error: error::codes::FORBIDDEN.to_string(),
                message,
                field: None,
                received: None,
                request_id,
                docs_hint,
            },
            AppError::ConfigMissing { .. } => {
                tracing::error!(request_id = %request_id, "Config missing: {}", message);
                ApiError {
                    error: error::codes::CONFIG_MISSING.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: Some("Set the variable and restart the gateway.".to_string()),
                }
            }
            AppError::Upstream(err) => {
                tracing::error!(request_id = %request_id, status = status.as_u16(), "Upstream error: {}", err);
                ApiError {
                    error: error::codes::UPSTREAM_ERROR.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: None,
                }
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = %request_id, "Internal error: {}", msg);
                ApiError {
                    error: error::codes::INTERNAL_ERROR.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: None,
                }
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential => AppError::ConfigMissing {
                message: err.to_string(),
            },
            other => AppError::Upstream(other),
        }
    }
}

impl From<TriggerAuthError> for AppError {
    fn from(err: TriggerAuthError) -> Self {
        match err {
            TriggerAuthError::MissingBearer => AppError::Unauthorized {
                message: err.to_string(),
                docs_hint: Some("Send the header `x-admin: Bearer <admin token>`.".to_string()),
            },
            TriggerAuthError::BadAdminToken => AppError::Forbidden {
                message: err.to_string(),
                docs_hint: None,
            },
            TriggerAuthError::NotWhitelisted => AppError::Forbidden {
                message: err.to_string(),
                docs_hint: Some(
                    "Add the rule id and its secret to SEQUENCE_RULE_SECRETS_JSON.".to_string(),
                ),
            },
        }
    }
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: Some("body".to_string()),
            received: None,
            docs_hint: Some("Send a JSON object or plain UTF-8 text.".to_string()),
        }
    }
}

impl From<BalanceError> for AppError {
    fn from(err: BalanceError) -> Self {
        let BalanceError::NotNumeric(ref received) = err;
        AppError::Validation {
            received: Some(received.clone()),
            message: err.to_string(),
            field: Some("checkingBalance".to_string()),
            docs_hint: Some("Send {\"checkingBalance\": <number>}.".to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON encoding failed: {err}"))
    }
}
