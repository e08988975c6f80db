//! Result Sinks
//!
//! A sink durably records benchmark results. Sinks are selected by URI; the
//! scheme (text before the first `:`) picks the factory, the remainder is
//! handed to it.

use crate::json::generate_results_json;
use benchgate_core::BenchmarkResults;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from resolving or writing a sink
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    /// No sink handles the URI scheme
    #[error("Unsupported result URI: {0}")]
    UnsupportedUri(String),

    /// The URI is malformed for its sink
    #[error("Invalid result URI '{uri}': {reason}")]
    InvalidUri {
        /// URI as configured
        uri: String,
        /// What is wrong with it
        reason: String,
    },

    /// Writing the target failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Results could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure raised by a custom sink
    #[error("{0}")]
    Custom(String),
}

/// Destination for benchmark results
pub trait ResultsSink {
    /// Record `results`; `output` is the run's console output
    fn write(&self, output: &mut dyn Write, results: &BenchmarkResults) -> Result<(), SinkError>;
}

/// Maps a URI to a sink
pub trait SinkResolver {
    /// `Ok(None)` means the URI selects no sink and results are discarded
    fn resolve(&self, uri: &str) -> Result<Option<Box<dyn ResultsSink>>, SinkError>;
}

type SinkFactory = Box<dyn Fn(&str) -> Result<Box<dyn ResultsSink>, SinkError> + Send + Sync>;

/// Scheme-keyed sink resolver
pub struct SinkRegistry {
    factories: BTreeMap<String, SinkFactory>,
}

impl SinkRegistry {
    /// Registry without any scheme
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with `stdout:`, `console:`, `json:` and `file:` schemes
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("stdout", |_| Ok(Box::new(ConsoleSink)));
        registry.register("console", |_| Ok(Box::new(ConsoleSink)));
        registry.register("json", |_| Ok(Box::new(JsonSink)));
        registry.register("file", |path| {
            if path.trim().is_empty() {
                return Err(SinkError::InvalidUri {
                    uri: format!("file:{}", path),
                    reason: "missing file path".to_string(),
                });
            }
            Ok(Box::new(JsonFileSink::new(path.trim())))
        });
        registry
    }

    /// Register (or replace) the factory for `scheme`
    pub fn register<F>(&mut self, scheme: impl Into<String>, factory: F)
    where
        F: Fn(&str) -> Result<Box<dyn ResultsSink>, SinkError> + Send + Sync + 'static,
    {
        self.factories.insert(scheme.into(), Box::new(factory));
    }

    /// Registered schemes
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SinkResolver for SinkRegistry {
    fn resolve(&self, uri: &str) -> Result<Option<Box<dyn ResultsSink>>, SinkError> {
        if uri.is_empty() {
            return Ok(None);
        }

        let (scheme, rest) = uri.split_once(':').unwrap_or((uri, ""));
        let factory = self
            .factories
            .get(scheme)
            .ok_or_else(|| SinkError::UnsupportedUri(uri.to_string()))?;

        factory(rest).map(Some)
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("schemes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Prints one line per record on the output channel
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ResultsSink for ConsoleSink {
    fn write(&self, output: &mut dyn Write, results: &BenchmarkResults) -> Result<(), SinkError> {
        let width = results
            .iter()
            .map(|r| r.benchmark.len())
            .max()
            .unwrap_or(9)
            .max(9);

        writeln!(
            output,
            "{:<width$}  {:>6}  {:>14}  {:>12}  Units",
            "Benchmark",
            "Mode",
            "Score",
            "Error",
            width = width
        )?;
        for record in results.iter() {
            writeln!(
                output,
                "{:<width$}  {:>6}  {:>14.3}  ± {:>10.3}  {}",
                record.benchmark,
                record.mode.label(),
                record.score,
                record.score_error,
                record.score_unit,
                width = width
            )?;
        }
        output.flush()?;
        Ok(())
    }
}

/// Prints the results as JSON on the output channel
#[derive(Debug, Default)]
pub struct JsonSink;

impl ResultsSink for JsonSink {
    fn write(&self, output: &mut dyn Write, results: &BenchmarkResults) -> Result<(), SinkError> {
        let json = generate_results_json(results)?;
        writeln!(output, "{}", json)?;
        output.flush()?;
        Ok(())
    }
}

/// Writes the results as JSON to a file, replacing it
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultsSink for JsonFileSink {
    fn write(&self, _output: &mut dyn Write, results: &BenchmarkResults) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = generate_results_json(results)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "results written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::{BenchmarkRecord, Mode};

    fn sample_results() -> BenchmarkResults {
        BenchmarkResults::new(vec![BenchmarkRecord {
            benchmark: "org.example.Codec.encode".to_string(),
            mode: Mode::Throughput,
            score: 1234.5,
            score_error: 12.25,
            score_unit: "ops/s".to_string(),
            params: Default::default(),
            samples: vec![1230.0, 1239.0],
        }])
    }

    #[test]
    fn test_empty_uri_resolves_to_nothing() {
        let registry = SinkRegistry::with_defaults();
        assert!(registry.resolve("").unwrap().is_none());
    }

    #[test]
    fn test_unknown_scheme_is_an_error() {
        let registry = SinkRegistry::with_defaults();
        assert!(matches!(
            registry.resolve("mongodb://localhost"),
            Err(SinkError::UnsupportedUri(_))
        ));
    }

    #[test]
    fn test_file_without_path_is_invalid() {
        let registry = SinkRegistry::with_defaults();
        assert!(matches!(registry.resolve("file:"), Err(SinkError::InvalidUri { .. })));
    }

    #[test]
    fn test_console_sink_lists_records() {
        let sink = SinkRegistry::with_defaults().resolve("stdout:").unwrap().unwrap();
        let mut out = Vec::new();
        sink.write(&mut out, &sample_results()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Benchmark"));
        assert!(text.contains("org.example.Codec.encode"));
        assert!(text.contains("thrpt"));
    }

    #[test]
    fn test_file_sink_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let uri = format!("file:{}", path.display());

        let sink = SinkRegistry::with_defaults().resolve(&uri).unwrap().unwrap();
        sink.write(&mut std::io::sink(), &sample_results()).unwrap();

        let parsed: BenchmarkResults =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, sample_results());
    }

    #[test]
    fn test_custom_scheme() {
        let mut registry = SinkRegistry::empty();
        registry.register("null", |_| Ok(Box::new(JsonSink)));
        assert!(registry.resolve("null:anything").unwrap().is_some());
        assert_eq!(registry.schemes().collect::<Vec<_>>(), ["null"]);
    }
}
