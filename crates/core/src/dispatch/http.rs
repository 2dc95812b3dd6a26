//! Synchronous JSON-over-HTTP transport to the log service.

use std::time::Instant;

use reqwest::{Client, StatusCode};

use super::{Dispatch, DispatchError, DispatchOutcome, CALL_TIMEOUT};
use crate::message::RequestEnvelope;

/// Builds the process-wide HTTP client: per-call timeout plus a pooled
/// connection per downstream host, reused by every call.
pub fn pooled_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(CALL_TIMEOUT)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
}

/// Text-protocol strategy: POST the envelope as JSON to a fixed endpoint
/// and accept only HTTP 202 as success.
pub struct HttpDispatch {
    client: Client,
    endpoint: String,
}

impl HttpDispatch {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Dispatch for HttpDispatch {
    async fn send(&self, envelope: &RequestEnvelope) -> DispatchOutcome {
        let started = Instant::now();
        match self.client.post(&self.endpoint).json(envelope).send().await {
            Ok(response) if response.status() == StatusCode::ACCEPTED => {
                DispatchOutcome::accepted(started.elapsed())
            }
            Ok(response) => DispatchOutcome::rejected(
                started.elapsed(),
                DispatchError::Rejected(response.status().as_u16()),
            ),
            Err(err) if err.is_timeout() => {
                DispatchOutcome::rejected(started.elapsed(), DispatchError::Timeout)
            }
            Err(err) => DispatchOutcome::rejected(
                started.elapsed(),
                DispatchError::Transport(err.to_string()),
            ),
        }
    }
}
