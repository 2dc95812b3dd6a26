/// Benchmarks broker-to-logger communication methods.
///
/// Drives the same workload through each broker entry point and reports
/// per-method latency and throughput.
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "logbench")]
pub struct Config {
    /// Base URL of the broker service under test.
    #[arg(default_value = "http://broker-service")]
    pub broker_url: String,
    /// Total number of requests issued per method.
    #[arg(default_value_t = 100)]
    pub requests: usize,
    /// Number of concurrent workers the requests are split across.
    #[arg(default_value_t = 10)]
    pub concurrency: usize,
}
