//! Results Publishing
//!
//! Fans one result set out to every configured sink. Resolution and write
//! failures are isolated per sink: they are logged, recorded in the
//! [`PublishReport`] and never stop the remaining sinks.

use crate::output::OutputChannel;
use crate::sink::{SinkError, SinkRegistry, SinkResolver};
use benchgate_core::BenchmarkResults;
use serde::{Deserialize, Serialize};

/// What happened to one sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum SinkStatus {
    /// Results written
    Written,
    /// The URI selected no sink
    Unresolved,
    /// Resolution or write failed
    Failed(String),
}

/// Outcome for one configured URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkOutcome {
    /// URI as configured
    pub uri: String,
    /// How the publish went
    pub status: SinkStatus,
}

/// Outcomes of one publish call, in URI order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    /// One outcome per URI
    pub outcomes: Vec<SinkOutcome>,
}

impl PublishReport {
    /// Outcomes whose sink failed
    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SinkStatus::Failed(_)))
    }

    /// Whether no sink failed
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Split a configured URI list. Unset or blank yields a single empty selector.
pub fn parse_uris(configured: Option<&str>) -> Vec<String> {
    match configured {
        Some(list) if !list.trim().is_empty() => {
            list.split(',').map(|uri| uri.trim().to_string()).collect()
        }
        _ => vec![String::new()],
    }
}

/// Publishes results through a sink resolver
pub struct ResultsPublisher {
    resolver: Box<dyn SinkResolver>,
}

impl ResultsPublisher {
    /// Publisher over a custom resolver
    pub fn new(resolver: impl SinkResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
        }
    }

    /// Publisher over [`SinkRegistry::with_defaults`]
    pub fn with_default_sinks() -> Self {
        Self::new(SinkRegistry::with_defaults())
    }

    /// Write `results` to every sink in `configured_uris`
    pub fn publish(
        &self,
        output: &mut OutputChannel,
        results: &BenchmarkResults,
        configured_uris: Option<&str>,
    ) -> PublishReport {
        let outcomes = parse_uris(configured_uris)
            .into_iter()
            .map(|uri| {
                let status = match self.write_one(output, results, &uri) {
                    Ok(true) => SinkStatus::Written,
                    Ok(false) => SinkStatus::Unresolved,
                    Err(e) => {
                        tracing::warn!(uri = %uri, error = %e, "result sink failed");
                        SinkStatus::Failed(e.to_string())
                    }
                };
                SinkOutcome { uri, status }
            })
            .collect();

        PublishReport { outcomes }
    }

    fn write_one(
        &self,
        output: &mut OutputChannel,
        results: &BenchmarkResults,
        uri: &str,
    ) -> Result<bool, SinkError> {
        let Some(sink) = self.resolver.resolve(uri)? else {
            tracing::debug!(uri = %uri, "no sink selected, results discarded");
            return Ok(false);
        };
        sink.write(output, results)?;
        tracing::debug!(uri = %uri, records = results.len(), "results published");
        Ok(true)
    }
}

impl Default for ResultsPublisher {
    fn default() -> Self {
        Self::with_default_sinks()
    }
}

impl std::fmt::Debug for ResultsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsPublisher").finish_non_exhaustive()
    }
}
