//! Output Formatting
//!
//! Human-readable output formatting for run reports.
//!
//! Generates terminal-friendly output with:
//! - Leaves grouped by class with status icons (✓/✗/⊘)
//! - Scores of completed leaves, skip reasons and failure messages
//! - A summary line

use benchgate_report::{LeafReport, LeafStatus, RunReport};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &RunReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Benchgate Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    // Group by class, keeping execution order
    let mut groups: Vec<(&str, Vec<&LeafReport>)> = Vec::new();
    for leaf in &report.leaves {
        match groups.iter_mut().find(|(name, _)| *name == leaf.class_name) {
            Some((_, leaves)) => leaves.push(leaf),
            None => groups.push((leaf.class_name.as_str(), vec![leaf])),
        }
    }

    for (class_name, leaves) in groups {
        output.push_str(&format!("Class: {}\n", class_name));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for leaf in leaves {
            let status_icon = match leaf.status {
                LeafStatus::Completed => "✓",
                LeafStatus::Failed => "✗",
                LeafStatus::Skipped => "⊘",
            };

            output.push_str(&format!("  {} {}\n", status_icon, leaf.method));

            if let Some(results) = &leaf.results {
                for record in results.iter() {
                    output.push_str(&format!(
                        "      {}: {:.3} ± {:.3} {}\n",
                        record.mode, record.score, record.score_error, record.score_unit
                    ));
                }
                if results.is_empty() {
                    output.push_str("      no records\n");
                }
            }

            if let Some(reason) = &leaf.reason {
                output.push_str(&format!("      skipped: {}\n", reason));
            }

            if let Some(failure) = &leaf.failure {
                output.push_str(&format!("      error ({}): {}\n", failure.kind, failure.message));
            }
        }
        output.push('\n');
    }

    let summary = &report.summary;
    output.push_str(&format!(
        "Summary: {} total, {} completed, {} failed, {} skipped ({:.1} ms)\n",
        summary.total,
        summary.completed,
        summary.failed,
        summary.skipped,
        summary.total_duration_ms
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_report::{FailureInfo, ReportMeta, SystemInfo};
    use chrono::Utc;

    fn leaf(class_name: &str, method: &str, status: LeafStatus) -> LeafReport {
        LeafReport {
            id: format!("[engine:benchgate]/[class:{}]/[method:{}]", class_name, method),
            class_name: class_name.to_string(),
            method: method.to_string(),
            status,
            reason: (status == LeafStatus::Skipped).then(|| "not today".to_string()),
            failure: (status == LeafStatus::Failed).then(|| FailureInfo {
                kind: "engine".to_string(),
                message: "boom".to_string(),
            }),
            results: None,
            duration_ms: 1.0,
        }
    }

    #[test]
    fn test_groups_and_summary() {
        let meta = ReportMeta {
            schema_version: 1,
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
            project_version: None,
            git_commit: None,
            system: SystemInfo {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                cpu_cores: 1,
            },
        };
        let report = RunReport::new(
            meta,
            vec![
                leaf("a.Codec", "encode", LeafStatus::Completed),
                leaf("a.Codec", "decode", LeafStatus::Failed),
                leaf("a.Slow", "run", LeafStatus::Skipped),
            ],
        );

        let text = format_human_output(&report);
        assert_eq!(text.matches("Class: a.Codec").count(), 1);
        assert!(text.contains("✗ decode"));
        assert!(text.contains("error (engine): boom"));
        assert!(text.contains("skipped: not today"));
        assert!(text.contains("Summary: 3 total, 1 completed, 1 failed, 1 skipped"));
    }
}
