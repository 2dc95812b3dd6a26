//! Binary RPC transport to the log service.

use std::time::Instant;

use tonic::transport::{Channel, Endpoint};
use tonic::Code;

use super::{Dispatch, DispatchError, DispatchOutcome, CALL_TIMEOUT};
use crate::logs::log_service_client::LogServiceClient;
use crate::logs::{LogEntry, LogRequest};
use crate::message::RequestEnvelope;

/// Binary-RPC strategy over one persistent, multiplexed channel.
///
/// The channel is probed once at startup. If it could not be established the
/// strategy stays unavailable for the process lifetime and every call fails
/// fast instead of hanging.
pub struct GrpcDispatch {
    client: Option<LogServiceClient<Channel>>,
}

impl GrpcDispatch {
    /// Probe `addr` (plaintext, no TLS) and keep the channel if it came up.
    pub async fn connect(addr: &str) -> Self {
        let endpoint = match Endpoint::from_shared(addr.to_owned()) {
            Ok(endpoint) => endpoint.timeout(CALL_TIMEOUT).connect_timeout(CALL_TIMEOUT),
            Err(err) => {
                tracing::warn!(%addr, error = %err, "invalid log service RPC address, transport unavailable");
                return Self::unavailable();
            }
        };
        match endpoint.connect().await {
            Ok(channel) => {
                tracing::info!(%addr, "connected to log service over binary RPC");
                Self {
                    client: Some(LogServiceClient::new(channel)),
                }
            }
            Err(err) => {
                tracing::warn!(%addr, error = %err, "log service RPC endpoint unreachable, transport unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { client: None }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

impl Dispatch for GrpcDispatch {
    async fn send(&self, envelope: &RequestEnvelope) -> DispatchOutcome {
        let started = Instant::now();
        let Some(client) = &self.client else {
            return DispatchOutcome::rejected(
                started.elapsed(),
                DispatchError::Unavailable("RPC channel was never established"),
            );
        };
        let request = LogRequest {
            entry: Some(LogEntry {
                name: envelope.record.name.clone(),
                data: envelope.record.data.clone(),
            }),
        };
        // Cloning the client reuses the underlying channel.
        match client.clone().write_log(request).await {
            Ok(_) => DispatchOutcome::accepted(started.elapsed()),
            Err(status) if status.code() == Code::DeadlineExceeded => {
                DispatchOutcome::rejected(started.elapsed(), DispatchError::Timeout)
            }
            Err(status) => DispatchOutcome::rejected(
                started.elapsed(),
                DispatchError::Transport(status.to_string()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::message::LogRecord;

    #[tokio::test]
    async fn unavailable_channel_fails_fast() {
        let dispatch = GrpcDispatch::unavailable();
        assert!(!dispatch.is_available());

        let envelope = RequestEnvelope::log(LogRecord {
            name: "test".into(),
            data: "test data".into(),
        });
        let started = Instant::now();
        let outcome = dispatch.send(&envelope).await;
        assert!(!outcome.is_success());
        assert!(matches!(
            outcome.error(),
            Some(DispatchError::Unavailable(_))
        ));
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
