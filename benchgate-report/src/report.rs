//! Report Data Structures

use benchgate_core::BenchmarkResults;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per method leaf, in execution order
    pub leaves: Vec<LeafReport>,
    /// Counts over `leaves`
    pub summary: RunSummary,
}

impl RunReport {
    /// Report over `leaves`, summary computed from them
    pub fn new(meta: ReportMeta, leaves: Vec<LeafReport>) -> Self {
        let summary = RunSummary::from_leaves(&leaves);
        Self {
            meta,
            leaves,
            summary,
        }
    }

    /// Whether any leaf failed
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Results of every completed leaf, in execution order
    pub fn completed_results(&self) -> BenchmarkResults {
        let mut all = BenchmarkResults::default();
        for leaf in &self.leaves {
            if let Some(results) = &leaf.results {
                all.merge(results.clone());
            }
        }
        all
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// Version of benchgate that produced the report
    pub version: String,
    /// When the report was built
    pub timestamp: DateTime<Utc>,
    /// Version of the project under benchmark, if configured
    pub project_version: Option<String>,
    /// Commit of the working tree, if inside git
    pub git_commit: Option<String>,
    /// Host description
    pub system: SystemInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Available parallelism
    pub cpu_cores: u32,
}

/// Outcome of one method leaf
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafReport {
    /// Unique id of the leaf node
    pub id: String,
    /// Fully qualified class name
    pub class_name: String,
    /// Method name
    pub method: String,
    /// Terminal status
    pub status: LeafStatus,
    /// Skip reason, when skipped
    pub reason: Option<String>,
    /// Failure details, when failed
    pub failure: Option<FailureInfo>,
    /// Engine results, when completed
    pub results: Option<BenchmarkResults>,
    /// Wall time in milliseconds
    pub duration_ms: f64,
}

/// Terminal leaf status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafStatus {
    /// Engine returned results
    Completed,
    /// Failed with an error
    Failed,
    /// Disabled and not run
    Skipped,
}

impl std::fmt::Display for LeafStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LeafStatus::Completed => "COMPLETED",
            LeafStatus::Failed => "FAILED",
            LeafStatus::Skipped => "SKIPPED",
        })
    }
}

/// Failure information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    /// Error category: `configuration`, `report_file` or `engine`
    pub kind: String,
    /// Error message
    pub message: String,
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of leaves
    pub total: usize,
    /// Completed leaves
    pub completed: usize,
    /// Failed leaves
    pub failed: usize,
    /// Skipped leaves
    pub skipped: usize,
    /// Sum of leaf durations in milliseconds
    pub total_duration_ms: f64,
}

impl RunSummary {
    /// Count statuses and sum durations
    pub fn from_leaves(leaves: &[LeafReport]) -> Self {
        let mut summary = RunSummary {
            total: leaves.len(),
            ..Default::default()
        };
        for leaf in leaves {
            match leaf.status {
                LeafStatus::Completed => summary.completed += 1,
                LeafStatus::Failed => summary.failed += 1,
                LeafStatus::Skipped => summary.skipped += 1,
            }
            summary.total_duration_ms += leaf.duration_ms;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(status: LeafStatus, duration_ms: f64) -> LeafReport {
        LeafReport {
            id: "[engine:benchgate]/[class:a.B]/[method:m]".to_string(),
            class_name: "a.B".to_string(),
            method: "m".to_string(),
            status,
            reason: None,
            failure: None,
            results: None,
            duration_ms,
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_leaves(&[
            leaf(LeafStatus::Completed, 10.0),
            leaf(LeafStatus::Completed, 5.0),
            leaf(LeafStatus::Failed, 1.0),
            leaf(LeafStatus::Skipped, 0.0),
        ]);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_duration_ms, 16.0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LeafStatus::Skipped).unwrap(), "\"skipped\"");
        assert_eq!(LeafStatus::Failed.to_string(), "FAILED");
    }
}
