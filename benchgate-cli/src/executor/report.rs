//! Report Building
//!
//! Converts leaf outcomes into the serializable [`RunReport`].

use super::execution::{LeafOutcome, LeafState};
use benchgate_report::{FailureInfo, LeafReport, LeafStatus, ReportMeta, RunReport};

/// Build a complete RunReport from leaf outcomes
pub fn build_report(outcomes: &[LeafOutcome], meta: ReportMeta) -> RunReport {
    let leaves = outcomes.iter().map(leaf_report).collect();
    RunReport::new(meta, leaves)
}

fn leaf_report(outcome: &LeafOutcome) -> LeafReport {
    let (status, reason, failure, results) = match &outcome.state {
        LeafState::Skipped { reason } => (LeafStatus::Skipped, Some(reason.clone()), None, None),
        LeafState::Completed(results) => (LeafStatus::Completed, None, None, Some(results.clone())),
        LeafState::Failed(error) => (
            LeafStatus::Failed,
            None,
            Some(FailureInfo {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
            None,
        ),
    };

    LeafReport {
        id: outcome.unique_id.clone(),
        class_name: outcome.class_name.clone(),
        method: outcome.method.clone(),
        status,
        reason,
        failure,
        results,
        duration_ms: outcome.duration.as_secs_f64() * 1000.0,
    }
}
