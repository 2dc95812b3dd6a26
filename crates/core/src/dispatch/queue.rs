//! Asynchronous queue transport: publish and return, no delivery wait.

use std::time::Instant;

use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, ExchangeKind};

use super::{Dispatch, DispatchError, DispatchOutcome};
use crate::amqp::SharedConnection;
use crate::message::RequestEnvelope;

/// Exchange log messages are published to; the relay service consumes from
/// a queue bound to it.
pub const LOG_EXCHANGE: &str = "logs_topic";
const LOG_ROUTING_KEY: &str = "log.INFO";

/// Queue-publish strategy over the shared broker connection.
///
/// Success means the broker accepted the publish; whether any consumer ever
/// processes the message is deliberately not part of the contract.
pub struct QueueDispatch {
    connection: SharedConnection,
}

impl QueueDispatch {
    /// Declare the exchange on a setup channel and keep the connection for
    /// per-call publish channels.
    pub async fn new(connection: SharedConnection) -> Result<Self, lapin::Error> {
        let channel = connection.create_channel().await?;
        channel
            .exchange_declare(
                LOG_EXCHANGE,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        Ok(Self { connection })
    }
}

impl Dispatch for QueueDispatch {
    async fn send(&self, envelope: &RequestEnvelope) -> DispatchOutcome {
        let started = Instant::now();
        let payload = match serde_json::to_vec(envelope) {
            Ok(payload) => payload,
            Err(err) => {
                return DispatchOutcome::rejected(
                    started.elapsed(),
                    DispatchError::Encode(err.to_string()),
                )
            }
        };
        let channel = match self.connection.create_channel().await {
            Ok(channel) => channel,
            Err(err) => {
                return DispatchOutcome::rejected(
                    started.elapsed(),
                    DispatchError::Transport(err.to_string()),
                )
            }
        };
        // The returned confirmation future is dropped on purpose: the
        // contract ends once the broker has taken the message.
        match channel
            .basic_publish(
                LOG_EXCHANGE,
                LOG_ROUTING_KEY,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
        {
            Ok(_confirm) => DispatchOutcome::accepted(started.elapsed()),
            Err(err) => DispatchOutcome::rejected(
                started.elapsed(),
                DispatchError::Transport(err.to_string()),
            ),
        }
    }
}
