//! JSON Output

use crate::report::RunReport;
use benchgate_core::BenchmarkResults;

/// Current run report schema version
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Generate a prettified JSON run report.
pub fn generate_json_report(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Render engine results as prettified JSON, the format of the per-class report file.
pub fn generate_results_json(results: &BenchmarkResults) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
