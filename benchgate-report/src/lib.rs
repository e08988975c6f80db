#![warn(missing_docs)]
//! Benchgate Report - Sinks, Publishing and Run Reports
//!
//! Moves benchmark results out of the run:
//! - Sink boundary and URI-based sink resolution
//! - Best-effort fan-out publishing with per-sink failure isolation
//! - Run report model and JSON rendering
//! - A console output channel that never closes stdout

mod json;
mod output;
mod publisher;
mod report;
mod sink;

pub use json::{REPORT_SCHEMA_VERSION, generate_json_report, generate_results_json};
pub use output::OutputChannel;
pub use publisher::{
    PublishReport, ResultsPublisher, SinkOutcome, SinkStatus, parse_uris,
};
pub use report::{
    FailureInfo, LeafReport, LeafStatus, ReportMeta, RunReport, RunSummary, SystemInfo,
};
pub use sink::{
    ConsoleSink, JsonFileSink, JsonSink, ResultsSink, SinkError, SinkRegistry, SinkResolver,
};

/// Output format selection for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
