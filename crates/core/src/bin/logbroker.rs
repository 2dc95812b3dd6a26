use std::future::IntoFuture;
use std::sync::Arc;

use clap::Parser;
use logbroker::amqp::ConnectionManager;
use logbroker::config::{set_logger, BrokerConfig};
use logbroker::dispatch::http::pooled_client;
use logbroker::dispatch::{GrpcDispatch, HttpDispatch, QueueDispatch};
use logbroker::server::{self, AppState};

fn main() -> anyhow::Result<()> {
    set_logger(None);
    let config = BrokerConfig::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(config))
}

async fn run(config: BrokerConfig) -> anyhow::Result<()> {
    // The queue is the only transport worth refusing to start without: if
    // the broker stays unreachable through the retry schedule, exit instead
    // of serving traffic that can never be queued.
    let mut manager = ConnectionManager::new();
    let connection = manager.connect(&config.amqp_url).await?;

    let grpc = GrpcDispatch::connect(&config.log_grpc_addr).await;
    let http = HttpDispatch::new(pooled_client()?, config.log_http_url.clone());
    let queue = QueueDispatch::new(Arc::clone(&connection)).await?;

    let state = Arc::new(AppState { http, grpc, queue });
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "broker service listening");

    tokio::select! {
        result = axum::serve(listener, server::router(state)).into_future() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    let _ = connection.close(200, "shutdown").await;
    Ok(())
}
