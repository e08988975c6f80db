//! Report Metadata
//!
//! Tool version, timestamp, project version, git commit and basic platform
//! details for the run report.

use benchgate_report::{REPORT_SCHEMA_VERSION, ReportMeta, SystemInfo};
use chrono::Utc;
use std::process::Command;

/// Build report metadata for a run of `project_version`
pub fn build_report_meta(project_version: Option<String>) -> ReportMeta {
    ReportMeta {
        schema_version: REPORT_SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        project_version,
        git_commit: git(&["rev-parse", "HEAD"]),
        system: SystemInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: std::thread::available_parallelism().map_or(1, |n| n.get() as u32),
        },
    }
}

/// Trimmed stdout of a successful git command
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
