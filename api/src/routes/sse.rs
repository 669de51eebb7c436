use std::convert::Infallible;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::header::CACHE_CONTROL;
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use futures::stream::{self, Stream, StreamExt};

use crate::state::AppState;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Connector validation stream. Both spellings are served since clients
/// disagree on the trailing slash.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sse/", get(sse_stream))
        .route("/sse", get(sse_stream))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Ready,
    /// Unix timestamp (seconds) at emission
    Heartbeat(i64),
}

impl StreamEvent {
    fn into_event(self) -> Event {
        match self {
            StreamEvent::Ready => Event::default().event("ready").data("ok"),
            StreamEvent::Heartbeat(ts) => Event::default().event("heartbeat").data(ts.to_string()),
        }
    }
}

/// `ready`, then a heartbeat right away and every `period` after.
///
/// The stream is lazy: nothing runs between polls, and when the client goes
/// away axum drops it, which ends the loop.
pub fn event_stream(period: Duration) -> impl Stream<Item = StreamEvent> {
    let heartbeats = stream::unfold(true, move |first| async move {
        if !first {
            tokio::time::sleep(period).await;
        }
        Some((StreamEvent::Heartbeat(chrono::Utc::now().timestamp()), false))
    });
    stream::once(async { StreamEvent::Ready }).chain(heartbeats)
}

/// Server-sent events keepalive
#[utoipa::path(
    get,
    path = "/sse/",
    responses(
        (status = 200, description = "`ready` then `heartbeat` every 15s", body = String, content_type = "text/event-stream")
    ),
    tag = "system"
)]
pub async fn sse_stream() -> impl IntoResponse {
    tracing::info!(event = "sse_connected", "SSE client connected");
    let events = event_stream(HEARTBEAT_INTERVAL).map(|e| Ok::<_, Infallible>(e.into_event()));
    (
        [(CACHE_CONTROL, "no-cache"), (X_ACCEL_BUFFERING, "no")],
        Sse::new(events),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn stream_starts_ready_then_heartbeats() {
        let before = chrono::Utc::now().timestamp();
        let events: Vec<StreamEvent> = event_stream(Duration::from_millis(5))
            .take(3)
            .collect()
            .await;

        assert_eq!(events[0], StreamEvent::Ready);
        for event in &events[1..] {
            match event {
                StreamEvent::Heartbeat(ts) => assert!(*ts >= before),
                other => panic!("expected heartbeat, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn first_heartbeat_does_not_wait_for_the_interval() {
        let events = tokio::time::timeout(
            Duration::from_secs(1),
            event_stream(Duration::from_secs(3600)).take(2).collect::<Vec<_>>(),
        )
        .await
        .expect("ready and first heartbeat should be immediate");
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn route_serves_event_stream_headers() {
        for uri in ["/sse/", "/sse"] {
            let response = crate::routes::app(test_state("http://127.0.0.1:9", &[]))
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("request should succeed");

            assert_eq!(response.status(), StatusCode::OK);
            let headers = response.headers();
            assert_eq!(headers["content-type"], "text/event-stream");
            assert_eq!(headers["cache-control"], "no-cache");
            assert_eq!(headers["x-accel-buffering"], "no");
            // Dropping the response here is the disconnect.
        }
    }
}
