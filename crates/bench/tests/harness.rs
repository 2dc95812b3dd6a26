//! Harness runs against an in-process stub broker with deterministic latency.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use logbench::harness::{run_benchmark, warmup, EntryPoint};
use logbroker::message::RequestEnvelope;

const STUB_LATENCY: Duration = Duration::from_millis(2);

async fn accept_log(Json(_envelope): Json<RequestEnvelope>) -> StatusCode {
    tokio::time::sleep(STUB_LATENCY).await;
    StatusCode::ACCEPTED
}

async fn reject_log(Json(_envelope): Json<RequestEnvelope>) -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_stub(rejecting: bool) -> String {
    let handler = if rejecting {
        post(reject_log)
    } else {
        post(accept_log)
    };
    let app = Router::new()
        .route("/log-http", handler.clone())
        .route("/log-rabbit", handler.clone())
        .route("/log-grpc", handler);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn every_entry_point_reports_full_success_against_the_stub() {
    let broker_url = spawn_stub(false).await;
    let client = reqwest::Client::new();
    warmup(&client, &broker_url).await;

    for entry in EntryPoint::ALL {
        let result = run_benchmark(&client, &broker_url, entry, 100, 10)
            .await
            .expect("benchmark run");
        assert_eq!(result.successes, 100, "{} successes", entry.method());
        assert_eq!(result.failures, 0, "{} failures", entry.method());
        assert_eq!(result.successes + result.failures, result.total_requests);

        let latency = result.latency.expect("successful run has latency stats");
        assert!(latency.min >= STUB_LATENCY);
        assert!(latency.min <= latency.avg && latency.avg <= latency.max);
        assert!(result.throughput > 0.0);
        // Throughput is defined against the wall clock of the whole run.
        let expected = result.successes as f64 / result.total_time.as_secs_f64();
        assert!((result.throughput - expected).abs() < f64::EPSILON);
    }
}

#[tokio::test]
async fn rejecting_downstream_is_reported_not_masked() {
    let broker_url = spawn_stub(true).await;
    let client = reqwest::Client::new();

    let result = run_benchmark(&client, &broker_url, EntryPoint::Http, 20, 4)
        .await
        .expect("benchmark run");
    assert_eq!(result.successes, 0);
    assert_eq!(result.failures, 20);
    assert!(result.latency.is_none(), "no latency stats without successes");
    assert_eq!(result.throughput, 0.0);
}

#[tokio::test]
async fn indivisible_totals_drop_the_remainder() {
    let broker_url = spawn_stub(false).await;
    let client = reqwest::Client::new();

    let result = run_benchmark(&client, &broker_url, EntryPoint::Http, 10, 3)
        .await
        .expect("benchmark run");
    // 3 workers x 3 iterations; the tenth request is dropped by design.
    assert_eq!(result.successes + result.failures, 9);
    assert_eq!(result.total_requests, 10);
}

#[tokio::test]
async fn unreachable_broker_counts_failures_instead_of_crashing() {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(250))
        .build()
        .expect("client");

    let result = run_benchmark(&client, "http://127.0.0.1:1", EntryPoint::Queue, 8, 2)
        .await
        .expect("benchmark run completes despite failures");
    assert_eq!(result.successes, 0);
    assert_eq!(result.failures, 8);
    assert!(result.latency.is_none());
}
