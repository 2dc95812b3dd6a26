//! Reduction of latency samples into per-method statistics.

use std::time::Duration;

/// Latency statistics over the successful samples of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStats {
    pub avg: Duration,
    pub min: Duration,
    pub max: Duration,
}

/// Aggregate outcome of one method's benchmark run. Computed once, after
/// every worker has finished; immutable thereafter.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub method: &'static str,
    pub total_time: Duration,
    pub total_requests: usize,
    pub successes: usize,
    pub failures: usize,
    /// `None` when no call succeeded: latency statistics are undefined then
    /// and must never be reported as zero.
    pub latency: Option<LatencyStats>,
    /// Successful requests per second of wall-clock run time. Deliberately
    /// not derived from the per-call latencies, so it reflects concurrency.
    pub throughput: f64,
}

impl BenchmarkResult {
    pub fn reduce(
        method: &'static str,
        total_time: Duration,
        total_requests: usize,
        latencies: Vec<Duration>,
        successes: usize,
        failures: usize,
    ) -> Self {
        let latency = match (latencies.iter().min(), latencies.iter().max()) {
            (Some(&min), Some(&max)) => {
                let sum: Duration = latencies.iter().sum();
                Some(LatencyStats {
                    avg: sum / latencies.len() as u32,
                    min,
                    max,
                })
            }
            _ => None,
        };
        let elapsed = total_time.as_secs_f64();
        let throughput = if elapsed > 0.0 {
            successes as f64 / elapsed
        } else {
            0.0
        };
        Self {
            method,
            total_time,
            total_requests,
            successes,
            failures,
            latency,
            throughput,
        }
    }
}
