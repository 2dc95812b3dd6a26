//! HTTP entry points, one per transport.
//!
//! Thin shell over the dispatch strategies: each route deserializes the JSON
//! envelope, invokes its transport through the shared [`AppState`] and maps
//! the outcome onto the uniform accepted/rejected signal (202 or 502).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::dispatch::{Dispatch, DispatchOutcome, GrpcDispatch, HttpDispatch, QueueDispatch};
use crate::message::RequestEnvelope;

/// Context object built once at startup and handed by reference into every
/// handler; never recreated per call.
pub struct AppState {
    pub http: HttpDispatch,
    pub grpc: GrpcDispatch,
    pub queue: QueueDispatch,
}

/// Body returned by every entry point.
#[derive(Debug, Serialize, Deserialize)]
pub struct BrokerResponse {
    pub error: bool,
    pub message: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/log-http", post(log_via_http))
        .route("/log-rabbit", post(log_via_queue))
        .route("/log-grpc", post(log_via_rpc))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn log_via_http(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<RequestEnvelope>,
) -> (StatusCode, Json<BrokerResponse>) {
    outcome_response("http", state.http.send(&envelope).await)
}

async fn log_via_queue(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<RequestEnvelope>,
) -> (StatusCode, Json<BrokerResponse>) {
    outcome_response("queue", state.queue.send(&envelope).await)
}

async fn log_via_rpc(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<RequestEnvelope>,
) -> (StatusCode, Json<BrokerResponse>) {
    outcome_response("rpc", state.grpc.send(&envelope).await)
}

fn outcome_response(via: &str, outcome: DispatchOutcome) -> (StatusCode, Json<BrokerResponse>) {
    match outcome.error() {
        None => (
            StatusCode::ACCEPTED,
            Json(BrokerResponse {
                error: false,
                message: format!("logged via {via}"),
            }),
        ),
        Some(err) => {
            tracing::error!(%via, error = %err, latency_ms = outcome.latency().as_millis() as u64, "dispatch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(BrokerResponse {
                    error: true,
                    message: err.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchError;
    use std::time::Duration;

    #[test]
    fn success_maps_to_accepted() {
        let (status, Json(body)) =
            outcome_response("http", DispatchOutcome::accepted(Duration::from_millis(1)));
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(!body.error);
    }

    #[test]
    fn failure_maps_to_bad_gateway() {
        let outcome = DispatchOutcome::rejected(
            Duration::from_millis(1),
            DispatchError::Unavailable("RPC channel was never established"),
        );
        let (status, Json(body)) = outcome_response("rpc", outcome);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error);
        assert!(body.message.contains("unavailable"));
    }
}
