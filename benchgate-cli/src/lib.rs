#![warn(missing_docs)]
//! Benchgate CLI Library
//!
//! Discovery, configuration resolution and execution orchestration, plus the
//! command-line entry point for benchmark binaries. The host supplies the
//! candidate classes and the benchmarking engine.
//!
//! # Example
//!
//! ```ignore
//! use benchgate::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let candidates = vec![
//!         ClassDecl::new("org.example.CodecBenchmark").method(MethodDecl::benchmark("encode")),
//!     ];
//!     benchgate_cli::run(candidates, my_engine)
//! }
//! ```

mod config;
mod descriptor;
mod discovery;
mod executor;
mod options;

pub use config::*;
pub use descriptor::{DescriptorTree, NodeId, NodeKind, NodeState, ROOT_ID};
pub use discovery::{DiscoveryRequest, discover, discover_with};
pub use executor::{
    GLOBAL_DISABLED_REASON, LeafError, LeafOutcome, LeafState, Orchestrator, build_report,
    build_report_meta, format_human_output,
};
pub use options::{
    ReportFileError, build_run_options, prepare_report_file, report_filename, report_path,
};

use benchgate_core::{BenchmarkEngine, ClassDecl};
use benchgate_report::{OutputFormat, RunReport, generate_json_report};
use clap::Parser;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// Benchgate CLI arguments
#[derive(Parser, Debug)]
#[command(name = "benchgate")]
#[command(author, version, about = "Benchgate - conditional benchmark orchestration")]
pub struct Cli {
    /// Filter benchmarks by regex on `<class>.<method>`
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Dry run - list the descriptor tree without executing
    #[arg(long)]
    pub list: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run report format: human, json
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Run report file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for per-class JSON report files
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Comma-separated result sink URIs
    #[arg(long)]
    pub publish: Option<String>,

    /// Warmup iterations
    #[arg(long)]
    pub warmup_iterations: Option<i64>,

    /// Warmup time per iteration (e.g. "3s")
    #[arg(long)]
    pub warmup_time: Option<String>,

    /// Measurement iterations
    #[arg(long)]
    pub measurement_iterations: Option<i64>,

    /// Measurement time per iteration (e.g. "5s")
    #[arg(long)]
    pub measurement_time: Option<String>,

    /// Number of forks
    #[arg(long)]
    pub forks: Option<i64>,

    /// Timeout per iteration (e.g. "10m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Benchmark mode: Throughput, AverageTime, SampleTime, SingleShotTime, All
    #[arg(long)]
    pub mode: Option<String>,

    /// Set a configuration property, `key=value`
    #[arg(short = 'D', long = "property", value_parser = PropertyMap::parse_assignment)]
    pub properties: Vec<(String, String)>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

impl Cli {
    /// Explicit overrides: `-D` properties, then dedicated flags on top
    pub fn overrides(&self) -> PropertyMap {
        let mut map: PropertyMap = self.properties.iter().cloned().collect();

        let flags = [
            (ConfigKey::ReportDir, self.report_dir.as_ref().map(|p| p.display().to_string())),
            (ConfigKey::PublishUri, self.publish.clone()),
            (ConfigKey::WarmupIterations, self.warmup_iterations.map(|n| n.to_string())),
            (ConfigKey::WarmupTime, self.warmup_time.clone()),
            (ConfigKey::MeasurementIterations, self.measurement_iterations.map(|n| n.to_string())),
            (ConfigKey::MeasurementTime, self.measurement_time.clone()),
            (ConfigKey::Forks, self.forks.map(|n| n.to_string())),
            (ConfigKey::Timeout, self.timeout.clone()),
            (ConfigKey::Mode, self.mode.clone()),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                map.set(key.property(), value);
            }
        }
        map
    }
}

/// Run the Benchgate CLI over `candidates` with the given engine.
/// This is the main entry point for benchmark binaries.
///
/// Exits the process with status 1 when any benchmark failed.
pub fn run<E: BenchmarkEngine>(
    candidates: impl IntoIterator<Item = ClassDecl>,
    engine: E,
) -> anyhow::Result<()> {
    let cli = Cli::parse();
    let report = run_with_cli(cli, candidates, engine)?;

    if let Some(report) = report {
        if report.has_failures() {
            eprintln!("\n{} benchmark(s) failed", report.summary.failed);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Run the Benchgate CLI with pre-parsed arguments.
///
/// Returns `None` for `--list`, otherwise the run report.
pub fn run_with_cli<E: BenchmarkEngine>(
    cli: Cli,
    candidates: impl IntoIterator<Item = ClassDecl>,
    engine: E,
) -> anyhow::Result<Option<RunReport>> {
    init_logging(cli.verbose);

    let filter = Regex::new(&cli.filter)
        .map_err(|e| anyhow::anyhow!("Invalid filter '{}': {}", cli.filter, e))?;

    // Environment and benchgate.toml, CLI flags on top
    let resolver = ConfigurationResolver::from_process().with_overrides(cli.overrides());

    let request = DiscoveryRequest::new()
        .with_filter(filter)
        .with_configuration(resolver.configuration_parameters());
    let tree = discover_with(candidates, request);
    let leaf_count = tree.leaves(tree.root()).len();

    if cli.list {
        println!("Benchgate Plan:");
        print!("{}", tree.render());
        println!("{} benchmarks found.", leaf_count);
        return Ok(None);
    }

    if leaf_count == 0 {
        println!("No benchmarks found.");
    } else {
        println!("Running {} benchmarks...\n", leaf_count);
    }

    let project_version = resolver.project_version();
    let mut orchestrator = Orchestrator::new(engine, resolver).with_progress(cli.progress);
    let outcomes = orchestrator.run(&tree);
    let report = build_report(&outcomes, build_report_meta(project_version));

    let output = match cli.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(Some(report))
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "benchgate=debug" } else { "benchgate=info" };
    // A host may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
