//! Engine Boundary
//!
//! The external benchmarking engine receives fully resolved [`RunOptions`] and
//! returns [`BenchmarkResults`] or an [`EngineError`]. Timing, forking and
//! statistics all happen on the other side of this boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Benchmark measurement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Operations per unit of time
    Throughput,
    /// Average time per operation
    AverageTime,
    /// Sampled time per operation
    SampleTime,
    /// Time of a single cold invocation
    SingleShotTime,
    /// All of the above
    All,
}

impl Mode {
    /// Short label used in engine output
    pub fn label(self) -> &'static str {
        match self {
            Mode::Throughput => "thrpt",
            Mode::AverageTime => "avgt",
            Mode::SampleTime => "sample",
            Mode::SingleShotTime => "ss",
            Mode::All => "all",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Throughput" | "thrpt" => Ok(Mode::Throughput),
            "AverageTime" | "avgt" => Ok(Mode::AverageTime),
            "SampleTime" | "sample" => Ok(Mode::SampleTime),
            "SingleShotTime" | "ss" => Ok(Mode::SingleShotTime),
            "All" | "all" => Ok(Mode::All),
            other => Err(format!(
                "Unknown mode: {} (expected one of Throughput, AverageTime, SampleTime, SingleShotTime, All)",
                other
            )),
        }
    }
}

/// How warmup iterations are scheduled across benchmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarmupMode {
    /// Warm up each benchmark individually
    Indi,
    /// Warm up all benchmarks in bulk first
    Bulk,
    /// Bulk warmup followed by individual warmup
    BulkIndi,
}

impl FromStr for WarmupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INDI" => Ok(WarmupMode::Indi),
            "BULK" => Ok(WarmupMode::Bulk),
            "BULK_INDI" => Ok(WarmupMode::BulkIndi),
            other => Err(format!(
                "Unknown warmup mode: {} (expected one of INDI, BULK, BULK_INDI)",
                other
            )),
        }
    }
}

/// Engine-facing options for one benchmark run.
///
/// Every `None` leaves the engine's own default in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Benchmark to include, `<class>.<method>`
    pub include: String,
    /// Fully qualified class name
    pub class_name: String,
    /// Method name
    pub method_name: String,
    /// Warmup iteration count
    pub warmup_iterations: Option<u32>,
    /// Duration of each warmup iteration
    pub warmup_time: Option<Duration>,
    /// Invocations per warmup operation
    pub warmup_batch_size: Option<u32>,
    /// Warmup mode
    pub warmup_mode: Option<WarmupMode>,
    /// Measurement iteration count
    pub measurement_iterations: Option<u32>,
    /// Duration of each measurement iteration
    pub measurement_time: Option<Duration>,
    /// Invocations per measurement operation
    pub measurement_batch_size: Option<u32>,
    /// Per-iteration timeout
    pub timeout: Option<Duration>,
    /// Benchmark mode
    pub mode: Option<Mode>,
    /// Number of forks
    pub forks: Option<u32>,
    /// JSON result file for this run
    pub result_file: Option<PathBuf>,
}

/// One measurement record returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Benchmark name, `<class>.<method>`
    pub benchmark: String,
    /// Mode the score was measured in
    pub mode: Mode,
    /// Primary score
    pub score: f64,
    /// Error margin of `score`
    pub score_error: f64,
    /// Unit of `score`, e.g. `ops/s`
    pub score_unit: String,
    /// Benchmark parameters, if parameterised
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Raw per-iteration scores
    #[serde(default)]
    pub samples: Vec<f64>,
}

/// Measurement records of one or more runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    /// Records in engine order
    pub records: Vec<BenchmarkRecord>,
}

impl BenchmarkResults {
    /// Wrap a set of records
    pub fn new(records: Vec<BenchmarkRecord>) -> Self {
        Self { records }
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over the records
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkRecord> {
        self.records.iter()
    }

    /// Append all records of `other`
    pub fn merge(&mut self, other: BenchmarkResults) {
        self.records.extend(other.records);
    }
}

impl FromIterator<BenchmarkRecord> for BenchmarkResults {
    fn from_iter<I: IntoIterator<Item = BenchmarkRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Failure raised across the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine reported a failure
    #[error("Benchmark execution failed: {0}")]
    Execution(String),

    /// The engine panicked, payload message
    #[error("Benchmark panicked: {0}")]
    Panicked(String),

    /// I/O failure inside the engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The external benchmarking engine.
///
/// An invocation blocks until the run finishes. An empty `Ok` result is a
/// successful run that produced no records, distinct from `Err`.
pub trait BenchmarkEngine {
    /// Run one benchmark with fully resolved options
    fn invoke(&self, options: &RunOptions) -> Result<BenchmarkResults, EngineError>;
}

impl<F> BenchmarkEngine for F
where
    F: Fn(&RunOptions) -> Result<BenchmarkResults, EngineError>,
{
    fn invoke(&self, options: &RunOptions) -> Result<BenchmarkResults, EngineError> {
        self(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Throughput".parse::<Mode>().unwrap(), Mode::Throughput);
        assert_eq!("avgt".parse::<Mode>().unwrap(), Mode::AverageTime);
        assert!("Fastest".parse::<Mode>().is_err());
    }

    #[test]
    fn test_warmup_mode_parsing() {
        assert_eq!("bulk_indi".parse::<WarmupMode>().unwrap(), WarmupMode::BulkIndi);
        assert_eq!("INDI".parse::<WarmupMode>().unwrap(), WarmupMode::Indi);
        assert!("SOMETIMES".parse::<WarmupMode>().is_err());
    }

    #[test]
    fn test_closure_engine() {
        let engine = |options: &RunOptions| -> Result<BenchmarkResults, EngineError> {
            Ok(BenchmarkResults::new(vec![BenchmarkRecord {
                benchmark: options.include.clone(),
                mode: options.mode.unwrap_or(Mode::Throughput),
                score: 1.0,
                score_error: 0.0,
                score_unit: "ops/s".to_string(),
                params: BTreeMap::new(),
                samples: Vec::new(),
            }]))
        };

        let options = RunOptions {
            include: "a.B.c".to_string(),
            ..Default::default()
        };
        let results = engine.invoke(&options).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.records[0].benchmark, "a.B.c");
    }
}
