//! Body extractor shared by the tool and remote-callback routes.
//!
//! Use `Payload` instead of `axum::Json<T>` where callers may post either a
//! JSON object or a bare string. Classification never rejects on content
//! type; only unreadable or non-UTF-8 bodies become an `AppError`.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use seqbridge_core::payload::Body;

use crate::error::AppError;

/// Request body classified as structured, raw text, or malformed.
///
/// # Example
/// ```ignore
/// async fn handler(Payload(body): Payload) -> Result<impl IntoResponse, AppError> {
///     let args = body.into_args("query")?;
/// }
/// ```
pub struct Payload(pub Body);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation {
                message: format!("Could not read request body: {}", rejection.body_text()),
                field: Some("body".to_string()),
                received: None,
                docs_hint: None,
            })?;
        Ok(Payload(Body::from_bytes(&bytes)))
    }
}
