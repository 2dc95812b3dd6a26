//! Human-readable benchmark output.

use prettytable::{Cell, Row, Table};

use crate::stats::BenchmarkResult;

const NOT_APPLICABLE: &str = "N/A";

pub fn print_result(result: &BenchmarkResult) {
    println!("Total Time:     {:?}", result.total_time);
    println!("Requests:       {}", result.total_requests);
    println!("Successes:      {}", result.successes);
    println!("Failures:       {}", result.failures);
    match &result.latency {
        Some(latency) => {
            println!("Avg Latency:    {:?}", latency.avg);
            println!("Min Latency:    {:?}", latency.min);
            println!("Max Latency:    {:?}", latency.max);
            println!("Throughput:     {:.2} req/s", result.throughput);
        }
        None => {
            println!("Latency:        {NOT_APPLICABLE} (no successful calls)");
        }
    }
}

pub fn print_summary(results: &[BenchmarkResult]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Method"),
        Cell::new("Avg Latency"),
        Cell::new("Throughput"),
        Cell::new("Success"),
        Cell::new("Failure"),
    ]));
    for result in results {
        let (avg, throughput) = match &result.latency {
            Some(latency) => (
                format!("{:?}", latency.avg),
                format!("{:.2} req/s", result.throughput),
            ),
            None => (NOT_APPLICABLE.to_string(), NOT_APPLICABLE.to_string()),
        };
        table.add_row(Row::new(vec![
            Cell::new(result.method),
            Cell::new(&avg),
            Cell::new(&throughput),
            Cell::new(&result.successes.to_string()),
            Cell::new(&result.failures.to_string()),
        ]));
    }
    table.printstd();
}
