//! Transport strategies for delivering a log request downstream.
//!
//! Three interchangeable strategies implement [`Dispatch`]: a JSON-over-HTTP
//! call ([`HttpDispatch`]), a binary RPC call ([`GrpcDispatch`]) and an
//! asynchronous queue publish ([`QueueDispatch`]). All of them fold their
//! failures into a [`DispatchOutcome`] instead of raising errors across the
//! transport boundary, so callers and the benchmark harness exercise every
//! variant identically.

use std::future::Future;
use std::time::Duration;

use crate::message::RequestEnvelope;

pub mod grpc;
pub mod http;
pub mod queue;

pub use grpc::GrpcDispatch;
pub use http::HttpDispatch;
pub use queue::QueueDispatch;

/// Per-call deadline for the synchronous transports. A call that outlives it
/// counts as a failure, never as fatal.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// A transport strategy. One envelope in, one outcome out; the dispatcher
/// never retries on its own, retry policy belongs to the caller.
pub trait Dispatch {
    fn send(&self, envelope: &RequestEnvelope)
        -> impl Future<Output = DispatchOutcome> + Send;
}

/// Why a dispatch was classified as a failure.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The transport was never usable; calls against it fail fast.
    #[error("transport unavailable: {0}")]
    Unavailable(&'static str),
    #[error("call timed out")]
    Timeout,
    /// The downstream service answered with something other than "accepted".
    #[error("downstream replied with status {0}")]
    Rejected(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("could not encode request: {0}")]
    Encode(String),
}

/// Uniform result of one dispatch, independent of the underlying protocol.
#[derive(Debug)]
pub struct DispatchOutcome {
    latency: Duration,
    error: Option<DispatchError>,
}

impl DispatchOutcome {
    pub fn accepted(latency: Duration) -> Self {
        Self {
            latency,
            error: None,
        }
    }

    pub fn rejected(latency: Duration, error: DispatchError) -> Self {
        Self {
            latency,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn error(&self) -> Option<&DispatchError> {
        self.error.as_ref()
    }
}
