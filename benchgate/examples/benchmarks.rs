//! Benchgate Example Harness
//!
//! Declares a few benchmark classes with conditions and configuration, and
//! drives them through a simulated engine. Serves as a template for wiring a
//! real engine into a benchmark binary.
//!
//! Run with:
//!   cargo run --example benchmarks                          # Run everything
//!   cargo run --example benchmarks -- --list                # Show the descriptor tree
//!   cargo run --example benchmarks -- 'Codec\.'             # Filter by <class>.<method>
//!   cargo run --example benchmarks -- -D suite=nightly      # Enable the nightly class
//!   cargo run --example benchmarks -- --publish stdout:     # Print results as a table

use benchgate::prelude::*;
use std::time::Duration;

fn candidates() -> Vec<ClassDecl> {
    vec![
        ClassDecl::new("org.example.CodecBenchmark")
            .annotate(Annotation::Warmup(
                IterationSettings::iterations(3).with_time(Duration::from_secs(1)),
            ))
            .annotate(Annotation::Fork(1))
            .method(MethodDecl::benchmark("encode"))
            .method(MethodDecl::benchmark("decode").annotate(Annotation::BenchmarkMode(Mode::AverageTime)))
            .method(MethodDecl::new("fixture")),
        ClassDecl::new("org.example.NightlyBenchmark")
            .annotate(Annotation::EnabledIfProperty {
                named: "suite".to_string(),
                matches: "nightly".to_string(),
            })
            .method(MethodDecl::benchmark("fullScan")),
        ClassDecl::new("org.example.WindowsOnlyBenchmark")
            .annotate(Annotation::EnabledOnOs(vec![Os::Windows]))
            .method(MethodDecl::benchmark("registryLookup")),
        ClassDecl::new("org.example.LegacyBenchmark")
            .annotate(Annotation::Disabled {
                reason: Some("Superseded by CodecBenchmark".to_string()),
            })
            .method(MethodDecl::benchmark("parse")),
    ]
}

/// Stands in for an external engine: derives a deterministic score from the options
fn simulated_engine(options: &RunOptions) -> Result<BenchmarkResults, EngineError> {
    let iterations = options.measurement_iterations.unwrap_or(5).max(1);
    let seed = options.include.bytes().map(u64::from).sum::<u64>();
    let samples: Vec<f64> = (0..iterations)
        .map(|i| 1_000.0 + ((seed + u64::from(i) * 37) % 100) as f64)
        .collect();
    let score = samples.iter().sum::<f64>() / samples.len() as f64;

    Ok(BenchmarkResults::new(vec![BenchmarkRecord {
        benchmark: options.include.clone(),
        mode: options.mode.unwrap_or(Mode::Throughput),
        score,
        score_error: 1.5,
        score_unit: "ops/s".to_string(),
        params: Default::default(),
        samples,
    }]))
}

fn main() -> anyhow::Result<()> {
    benchgate::run(candidates(), simulated_engine)
}
