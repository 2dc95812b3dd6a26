//! Logbroker core library.
//!
//! Accepts logging requests and delivers them to the downstream log service
//! over one of three interchangeable transports: a JSON-over-HTTP call, a
//! binary RPC call, or an asynchronous publish onto the message queue. The
//! [`amqp`] module owns the queue connection lifecycle, [`dispatch`] holds
//! the transport strategies behind one uniform outcome contract, and
//! [`server`] exposes the per-transport HTTP entry points.

pub mod amqp;
pub mod config;
pub mod dispatch;
pub mod message;
pub mod server;

/// Generated protobuf types and service definitions for the log service
/// wire contract.
pub mod logs {
    tonic::include_proto!("logs");
}
