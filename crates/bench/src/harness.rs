//! Concurrent workload generation against the broker entry points.

use std::sync::Arc;
use std::time::{Duration, Instant};

use logbroker::message::{LogRecord, RequestEnvelope};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};

use crate::stats::BenchmarkResult;

/// The broker entry points, one per transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Http,
    Queue,
    Rpc,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 3] = [EntryPoint::Http, EntryPoint::Queue, EntryPoint::Rpc];

    pub fn path(&self) -> &'static str {
        match self {
            EntryPoint::Http => "/log-http",
            EntryPoint::Queue => "/log-rabbit",
            EntryPoint::Rpc => "/log-grpc",
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            EntryPoint::Http => "HTTP",
            EntryPoint::Queue => "RabbitMQ",
            EntryPoint::Rpc => "gRPC",
        }
    }

    fn sample_prefix(&self) -> &'static str {
        match self {
            EntryPoint::Http => "http-test",
            EntryPoint::Queue => "rabbit-test",
            EntryPoint::Rpc => "grpc-test",
        }
    }

    fn sample_data(&self) -> &'static str {
        match self {
            EntryPoint::Http => "HTTP benchmark data",
            EntryPoint::Queue => "RabbitMQ benchmark data",
            EntryPoint::Rpc => "gRPC benchmark data",
        }
    }

    fn url(&self, broker_url: &str) -> String {
        format!("{}{}", broker_url.trim_end_matches('/'), self.path())
    }
}

/// Shared result collector. Workers append under a single lock held only
/// for the append itself, never across a network call.
#[derive(Default)]
struct Collector {
    inner: Mutex<CollectorInner>,
}

#[derive(Default)]
struct CollectorInner {
    latencies: Vec<Duration>,
    successes: usize,
    failures: usize,
}

impl Collector {
    fn record(&self, accepted: bool, latency: Duration) {
        let mut inner = self.inner.lock();
        if accepted {
            inner.successes += 1;
            inner.latencies.push(latency);
        } else {
            inner.failures += 1;
        }
    }

    fn into_parts(self) -> (Vec<Duration>, usize, usize) {
        let inner = self.inner.into_inner();
        (inner.latencies, inner.successes, inner.failures)
    }
}

/// Requests each worker issues. The division remainder is dropped, not
/// redistributed.
pub fn per_worker(total_requests: usize, concurrency: usize) -> usize {
    total_requests / concurrency
}

/// One throwaway call before any timing starts, so one-time connection
/// setup cost stays out of the measured runs.
pub async fn warmup(client: &Client, broker_url: &str) {
    let envelope = RequestEnvelope::log(LogRecord {
        name: "warmup".into(),
        data: "warmup data".into(),
    });
    let url = EntryPoint::Http.url(broker_url);
    if let Err(err) = client.post(&url).json(&envelope).send().await {
        tracing::debug!(error = %err, "warmup call failed");
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Drive one entry point with `total_requests` split across `concurrency`
/// workers and reduce the samples after every worker has finished.
pub async fn run_benchmark(
    client: &Client,
    broker_url: &str,
    entry: EntryPoint,
    total_requests: usize,
    concurrency: usize,
) -> anyhow::Result<BenchmarkResult> {
    let url = entry.url(broker_url);
    let iterations = per_worker(total_requests, concurrency);
    let collector = Arc::new(Collector::default());

    let started = Instant::now();
    let mut workers = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let client = client.clone();
        let url = url.clone();
        let collector = Arc::clone(&collector);
        workers.push(tokio::spawn(async move {
            for iteration in 0..iterations {
                let envelope = RequestEnvelope::log(LogRecord {
                    name: format!("{}-{iteration}", entry.sample_prefix()),
                    data: format!("{} {iteration}", entry.sample_data()),
                });
                let call_started = Instant::now();
                let response = client.post(&url).json(&envelope).send().await;
                let latency = call_started.elapsed();
                let accepted =
                    matches!(&response, Ok(resp) if resp.status() == StatusCode::ACCEPTED);
                collector.record(accepted, latency);
            }
        }));
    }
    // Synchronization barrier: statistics are only read once every worker
    // has completed its assigned iterations.
    for worker in workers {
        worker.await?;
    }
    let total_time = started.elapsed();

    let collector = Arc::into_inner(collector)
        .ok_or_else(|| anyhow::anyhow!("collector still shared after the barrier"))?;
    let (latencies, successes, failures) = collector.into_parts();
    Ok(BenchmarkResult::reduce(
        entry.method(),
        total_time,
        total_requests,
        latencies,
        successes,
        failures,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_share_drops_the_remainder() {
        assert_eq!(per_worker(100, 10), 10);
        assert_eq!(per_worker(10, 3), 3);
        assert_eq!(per_worker(5, 10), 0);
    }

    #[test]
    fn entry_points_cover_all_routes() {
        let paths: Vec<_> = EntryPoint::ALL.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["/log-http", "/log-rabbit", "/log-grpc"]);
    }

    #[test]
    fn collector_separates_successes_from_failures() {
        let collector = Collector::default();
        collector.record(true, Duration::from_millis(5));
        collector.record(false, Duration::from_millis(9));
        collector.record(true, Duration::from_millis(7));
        let (latencies, successes, failures) = collector.into_parts();
        assert_eq!(successes, 2);
        assert_eq!(failures, 1);
        assert_eq!(
            latencies,
            vec![Duration::from_millis(5), Duration::from_millis(7)]
        );
    }
}
