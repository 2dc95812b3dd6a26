use clap::Parser;

use logbench::config::Config;
use logbench::harness::{self, EntryPoint};
use logbench::report;

fn main() -> anyhow::Result<()> {
    logbroker::config::set_logger(None);
    let config = Config::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    println!("Benchmarking broker->logger communication methods");
    println!("Broker URL: {}", config.broker_url);
    println!("Requests: {}", config.requests);
    println!("Concurrency: {}\n", config.concurrency);

    let client = reqwest::Client::builder()
        .timeout(logbroker::dispatch::CALL_TIMEOUT)
        .build()?;

    println!("Warming up...");
    harness::warmup(&client, &config.broker_url).await;

    let mut results = Vec::with_capacity(EntryPoint::ALL.len());
    for entry in EntryPoint::ALL {
        println!("\n=== Benchmarking {} ===", entry.method());
        let result = harness::run_benchmark(
            &client,
            &config.broker_url,
            entry,
            config.requests,
            config.concurrency,
        )
        .await?;
        report::print_result(&result);
        results.push(result);
    }

    println!("\n=== SUMMARY ===");
    report::print_summary(&results);

    // Failures are part of the report, not a tool failure: exit 0 either way.
    Ok(())
}
