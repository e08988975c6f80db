//! Configuration resolution
//!
//! Every recognized key is looked up through a fixed precedence chain, highest
//! first:
//!
//! 1. explicit overrides (programmatic, CLI flags, `-D key=value`)
//! 2. process sources: `BENCHGATE_<KEY>` environment variables, then the
//!    `[properties]` table of a `benchgate.toml` discovered by walking up from
//!    the current directory
//! 3. method-level annotations, then class-level annotations
//! 4. library defaults
//!
//! Numeric and duration values that are zero or negative, and strings that
//! are blank, count as unset and fall through to the next source. Values that
//! do not parse fail resolution with [`ConfigError::InvalidConfigurationValue`].

use benchgate_core::{
    AnnotatedElement, Annotation, ClassDecl, ConfigurationParameters, MethodDecl, Mode, WarmupMode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Name of the discovered configuration file
pub const CONFIG_FILE_NAME: &str = "benchgate.toml";

/// Prefix of environment variables read by [`EnvironmentSource`]
pub const ENV_PREFIX: &str = "BENCHGATE";

/// Configuration resolution error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A property value failed to parse or validate
    #[error("Invalid value '{value}' for configuration key '{key}': {reason}")]
    InvalidConfigurationValue {
        /// Property name
        key: String,
        /// Raw value as found
        value: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: ConfigKey, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfigurationValue {
            key: key.property().to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Recognized configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// `warmup.iterations`
    WarmupIterations,
    /// `warmup.time`
    WarmupTime,
    /// `warmup.batchSize`
    WarmupBatchSize,
    /// `warmup.mode`
    WarmupMode,
    /// `measurement.iterations`
    MeasurementIterations,
    /// `measurement.time`
    MeasurementTime,
    /// `measurement.batchSize`
    MeasurementBatchSize,
    /// `timeout`
    Timeout,
    /// `mode`
    Mode,
    /// `forks`
    Forks,
    /// `report.dir`
    ReportDir,
    /// `publish.uri`
    PublishUri,
    /// `enabled`
    Enabled,
    /// `project.version`
    ProjectVersion,
}

impl ConfigKey {
    /// All keys
    pub const ALL: [ConfigKey; 14] = [
        ConfigKey::WarmupIterations,
        ConfigKey::WarmupTime,
        ConfigKey::WarmupBatchSize,
        ConfigKey::WarmupMode,
        ConfigKey::MeasurementIterations,
        ConfigKey::MeasurementTime,
        ConfigKey::MeasurementBatchSize,
        ConfigKey::Timeout,
        ConfigKey::Mode,
        ConfigKey::Forks,
        ConfigKey::ReportDir,
        ConfigKey::PublishUri,
        ConfigKey::Enabled,
        ConfigKey::ProjectVersion,
    ];

    /// Dotted property name
    pub fn property(self) -> &'static str {
        match self {
            ConfigKey::WarmupIterations => "warmup.iterations",
            ConfigKey::WarmupTime => "warmup.time",
            ConfigKey::WarmupBatchSize => "warmup.batch-size",
            ConfigKey::WarmupMode => "warmup.mode",
            ConfigKey::MeasurementIterations => "measurement.iterations",
            ConfigKey::MeasurementTime => "measurement.time",
            ConfigKey::MeasurementBatchSize => "measurement.batch-size",
            ConfigKey::Timeout => "timeout",
            ConfigKey::Mode => "mode",
            ConfigKey::Forks => "forks",
            ConfigKey::ReportDir => "report.dir",
            ConfigKey::PublishUri => "publish.uri",
            ConfigKey::Enabled => "enabled",
            ConfigKey::ProjectVersion => "project.version",
        }
    }

    /// Environment variable name, e.g. `BENCHGATE_WARMUP_BATCH_SIZE`
    pub fn env_var(self) -> String {
        env_var_name(ENV_PREFIX, self.property())
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property())
    }
}

fn env_var_name(prefix: &str, property: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + property.len() + 1);
    name.push_str(prefix);
    name.push('_');
    for c in property.chars() {
        match c {
            '.' | '-' => name.push('_'),
            c => name.push(c.to_ascii_uppercase()),
        }
    }
    name
}

/// A layer of raw string properties
pub trait PropertySource: Send + Sync {
    /// Raw value of `key`, if the source defines it
    fn property(&self, key: &str) -> Option<String>;

    /// Every property the source defines
    fn entries(&self) -> Vec<(String, String)>;
}

/// In-memory properties, used for overrides and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    values: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`PropertyMap::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Parse a `key=value` assignment
    pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("missing key in '{}'", s));
        }
        Ok((key.to_string(), value.to_string()))
    }

    /// Whether no property is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertySource for PropertyMap {
    fn property(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// `BENCHGATE_<KEY>` environment variables
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    prefix: String,
}

impl EnvironmentSource {
    /// Source with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvironmentSource {
    fn default() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }
}

impl PropertySource for EnvironmentSource {
    fn property(&self, key: &str) -> Option<String> {
        std::env::var(env_var_name(&self.prefix, key)).ok()
    }

    // Variable names are lossy ('.' and '-' both map to '_'), so entries come
    // back with '.' separators.
    fn entries(&self) -> Vec<(String, String)> {
        let prefix = format!("{}_", self.prefix);
        std::env::vars()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(&prefix)?;
                Some((rest.to_ascii_lowercase().replace('_', "."), value))
            })
            .collect()
    }
}

/// Contents of a `benchgate.toml` file
///
/// ```toml
/// [properties]
/// warmup.iterations = 5
/// measurement.time = "2s"
/// publish.uri = ["stdout:", "file:target/results.json"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Property table; nested tables flatten into dotted keys
    #[serde(default)]
    pub properties: toml::Table,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(dir)
    }

    /// Walk up from `dir` looking for `benchgate.toml`
    pub fn discover_from(dir: impl Into<PathBuf>) -> Option<Self> {
        let mut dir = dir.into();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable configuration file");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
        for (key, value) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match value {
                toml::Value::Table(nested) => Self::flatten(&path, nested, out),
                other => {
                    out.insert(path, Self::render(other));
                }
            }
        }
    }

    fn render(value: &toml::Value) -> String {
        match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Array(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }

    fn flattened(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        Self::flatten("", &self.properties, &mut out);
        out
    }
}

impl PropertySource for ConfigFile {
    fn property(&self, key: &str) -> Option<String> {
        self.flattened().remove(key)
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.flattened().into_iter().collect()
    }
}

/// Parse duration string (e.g., "3s", "500ms", "2m"); a bare number is seconds.
///
/// Negative values parse; callers decide what they mean.
pub fn parse_duration(s: &str) -> anyhow::Result<(bool, Duration)> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Empty duration string"));
    }
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };

    // Find where the number ends and unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
    if !value.is_finite() {
        return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
    }

    let multiplier: f64 = match unit_part.to_lowercase().as_str() {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" | "" => 1.0,
        "m" | "min" => 60.0,
        _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
    };

    let secs = value * multiplier;
    let duration = Duration::try_from_secs_f64(secs.abs())
        .map_err(|_| anyhow::anyhow!("Duration out of range: {}", s))?;
    Ok((negative || secs < 0.0, duration))
}

/// Effective configuration for one benchmark.
///
/// `None` means unset: the engine keeps its own default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfiguration {
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
    /// Directory for per-class JSON report files
    pub report_dir: Option<PathBuf>,
    /// Comma separated publish targets
    pub publish_uri: Option<String>,
    /// Global switch, `false` skips every benchmark
    pub enabled: bool,
    /// Version of the project under benchmark, prefixed to report file names
    pub project_version: Option<String>,
}

impl Default for BenchmarkConfiguration {
    fn default() -> Self {
        Self {
            warmup_iterations: None,
            warmup_time: None,
            warmup_batch_size: None,
            warmup_mode: None,
            measurement_iterations: None,
            measurement_time: None,
            measurement_batch_size: None,
            timeout: None,
            mode: None,
            forks: None,
            report_dir: None,
            publish_uri: None,
            enabled: true,
            project_version: None,
        }
    }
}

/// Merges override, process and declared configuration
pub struct ConfigurationResolver {
    overrides: PropertyMap,
    process: Vec<Box<dyn PropertySource>>,
}

impl ConfigurationResolver {
    /// Resolver without any source; everything resolves to library defaults
    pub fn new() -> Self {
        Self {
            overrides: PropertyMap::new(),
            process: Vec::new(),
        }
    }

    /// Resolver reading the environment and a discovered `benchgate.toml`
    pub fn from_process() -> Self {
        let resolver = Self::new().with_source(EnvironmentSource::default());
        match ConfigFile::discover() {
            Some(file) => resolver.with_source(file),
            None => resolver,
        }
    }

    /// Replace the explicit overrides
    pub fn with_overrides(mut self, overrides: PropertyMap) -> Self {
        self.overrides = overrides;
        self
    }

    /// Append a process-level source, below the ones already added
    pub fn with_source(mut self, source: impl PropertySource + 'static) -> Self {
        self.process.push(Box::new(source));
        self
    }

    /// Explicit overrides
    pub fn overrides(&self) -> &PropertyMap {
        &self.overrides
    }

    /// Configuration with no declared defaults
    pub fn resolve(&self) -> Result<BenchmarkConfiguration, ConfigError> {
        self.resolve_scoped(&Scope::default())
    }

    /// Configuration scoped to a class and optionally one of its methods
    pub fn resolve_for(
        &self,
        class: &ClassDecl,
        method: Option<&MethodDecl>,
    ) -> Result<BenchmarkConfiguration, ConfigError> {
        let mut scope = Scope::default();
        if let Some(method) = method {
            scope.levels.push(method.annotations());
        }
        scope.levels.push(class.annotations());
        self.resolve_scoped(&scope)
    }

    /// The global `enabled` switch
    pub fn resolve_enabled(&self) -> Result<bool, ConfigError> {
        self.flag(ConfigKey::Enabled, true)
    }

    /// The `project.version` property, independent of every other key
    pub fn project_version(&self) -> Option<String> {
        self.text(ConfigKey::ProjectVersion)
    }

    /// Every property from every source, overrides winning, for property conditions
    pub fn configuration_parameters(&self) -> ConfigurationParameters {
        let mut merged = BTreeMap::new();
        for source in self.process.iter().rev() {
            merged.extend(source.entries());
        }
        merged.extend(self.overrides.entries());
        merged.into_iter().collect()
    }

    fn resolve_scoped(&self, scope: &Scope<'_>) -> Result<BenchmarkConfiguration, ConfigError> {
        Ok(BenchmarkConfiguration {
            warmup_iterations: self.count(
                ConfigKey::WarmupIterations,
                scope.declared(|a| match a {
                    Annotation::Warmup(s) => Some(s.iterations),
                    _ => None,
                }),
            )?,
            warmup_time: self.duration(
                ConfigKey::WarmupTime,
                scope.declared(|a| match a {
                    Annotation::Warmup(s) => Some(s.time),
                    _ => None,
                }),
            )?,
            warmup_batch_size: self.count(
                ConfigKey::WarmupBatchSize,
                scope.declared(|a| match a {
                    Annotation::Warmup(s) => Some(s.batch_size),
                    _ => None,
                }),
            )?,
            warmup_mode: self.choice::<WarmupMode>(ConfigKey::WarmupMode, None)?,
            measurement_iterations: self.count(
                ConfigKey::MeasurementIterations,
                scope.declared(|a| match a {
                    Annotation::Measurement(s) => Some(s.iterations),
                    _ => None,
                }),
            )?,
            measurement_time: self.duration(
                ConfigKey::MeasurementTime,
                scope.declared(|a| match a {
                    Annotation::Measurement(s) => Some(s.time),
                    _ => None,
                }),
            )?,
            measurement_batch_size: self.count(
                ConfigKey::MeasurementBatchSize,
                scope.declared(|a| match a {
                    Annotation::Measurement(s) => Some(s.batch_size),
                    _ => None,
                }),
            )?,
            timeout: self.duration(
                ConfigKey::Timeout,
                scope.declared(|a| match a {
                    Annotation::Timeout(d) => Some(*d),
                    _ => None,
                }),
            )?,
            mode: self.choice::<Mode>(
                ConfigKey::Mode,
                scope
                    .declared(|a| match a {
                        Annotation::BenchmarkMode(m) => Some(*m),
                        _ => None,
                    })
                    .into_iter()
                    .next(),
            )?,
            forks: self.count(
                ConfigKey::Forks,
                scope.declared(|a| match a {
                    Annotation::Fork(n) => Some(*n),
                    _ => None,
                }),
            )?,
            report_dir: self.text(ConfigKey::ReportDir).map(PathBuf::from),
            publish_uri: self.text(ConfigKey::PublishUri),
            enabled: self.flag(ConfigKey::Enabled, true)?,
            project_version: self.text(ConfigKey::ProjectVersion),
        })
    }

    /// Raw values for `key`, highest precedence first
    fn layers(&self, key: ConfigKey) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.overrides.property(key.property()))
            .chain(self.process.iter().map(move |s| s.property(key.property())))
            .flatten()
    }

    fn count(&self, key: ConfigKey, declared: Vec<i32>) -> Result<Option<u32>, ConfigError> {
        for raw in self.layers(key) {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            let n: i64 = value
                .parse()
                .map_err(|_| ConfigError::invalid(key, &raw, "expected an integer"))?;
            if n <= 0 {
                continue;
            }
            let n = u32::try_from(n).map_err(|_| ConfigError::invalid(key, &raw, "value too large"))?;
            return Ok(Some(n));
        }

        Ok(declared
            .into_iter()
            .find(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok()))
    }

    fn duration(&self, key: ConfigKey, declared: Vec<Duration>) -> Result<Option<Duration>, ConfigError> {
        for raw in self.layers(key) {
            if raw.trim().is_empty() {
                continue;
            }
            let (negative, duration) =
                parse_duration(&raw).map_err(|e| ConfigError::invalid(key, &raw, e.to_string()))?;
            if negative || duration.is_zero() {
                continue;
            }
            return Ok(Some(duration));
        }

        Ok(declared.into_iter().find(|d| !d.is_zero()))
    }

    fn choice<T: FromStr<Err = String>>(
        &self,
        key: ConfigKey,
        declared: Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        for raw in self.layers(key) {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            return value
                .parse::<T>()
                .map(Some)
                .map_err(|reason| ConfigError::invalid(key, &raw, reason));
        }
        Ok(declared)
    }

    fn text(&self, key: ConfigKey) -> Option<String> {
        self.layers(key)
            .map(|raw| raw.trim().to_string())
            .find(|value| !value.is_empty())
    }

    fn flag(&self, key: ConfigKey, default: bool) -> Result<bool, ConfigError> {
        for raw in self.layers(key) {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            return match value.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ConfigError::invalid(key, &raw, "expected true or false")),
            };
        }
        Ok(default)
    }
}

impl Default for ConfigurationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigurationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("overrides", &self.overrides)
            .field("process_sources", &self.process.len())
            .finish()
    }
}

/// Annotation levels consulted for declared defaults, nearest first
#[derive(Default)]
struct Scope<'a> {
    levels: Vec<&'a [Annotation]>,
}

impl<'a> Scope<'a> {
    fn declared<T>(&self, pick: impl Fn(&'a Annotation) -> Option<T>) -> Vec<T> {
        self.levels
            .iter()
            .copied()
            .flat_map(|level| level.iter().filter_map(&pick))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::IterationSettings;

    fn class() -> ClassDecl {
        ClassDecl::new("org.example.Codec")
            .annotate(Annotation::Warmup(
                IterationSettings::iterations(3).with_time(Duration::from_secs(2)),
            ))
            .annotate(Annotation::Fork(2))
    }

    fn method() -> MethodDecl {
        MethodDecl::benchmark("encode").annotate(Annotation::Warmup(IterationSettings::iterations(7)))
    }

    #[test]
    fn test_library_defaults() {
        let config = ConfigurationResolver::new().resolve().unwrap();
        assert_eq!(config, BenchmarkConfiguration::default());
        assert!(config.enabled);
    }

    #[test]
    fn test_precedence_chain() {
        let class = class();
        let method = method();

        let declared = ConfigurationResolver::new()
            .resolve_for(&class, Some(&method))
            .unwrap();
        assert_eq!(declared.warmup_iterations, Some(7));
        assert_eq!(declared.warmup_time, Some(Duration::from_secs(2)));
        assert_eq!(declared.forks, Some(2));

        let process = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("warmup.iterations", "11"))
            .resolve_for(&class, Some(&method))
            .unwrap();
        assert_eq!(process.warmup_iterations, Some(11));

        let overridden = ConfigurationResolver::new()
            .with_overrides(PropertyMap::new().with("warmup.iterations", "13"))
            .with_source(PropertyMap::new().with("warmup.iterations", "11"))
            .resolve_for(&class, Some(&method))
            .unwrap();
        assert_eq!(overridden.warmup_iterations, Some(13));
    }

    #[test]
    fn test_zero_and_blank_fall_through() {
        let resolver = ConfigurationResolver::new()
            .with_overrides(
                PropertyMap::new()
                    .with("forks", "0")
                    .with("warmup.time", "-5s")
                    .with("report.dir", "   "),
            )
            .with_source(
                PropertyMap::new()
                    .with("forks", "-1")
                    .with("report.dir", "target/reports"),
            );

        let config = resolver.resolve_for(&class(), None).unwrap();
        assert_eq!(config.forks, Some(2));
        assert_eq!(config.warmup_time, Some(Duration::from_secs(2)));
        assert_eq!(config.report_dir, Some(PathBuf::from("target/reports")));
    }

    #[test]
    fn test_invalid_mode_is_an_error() {
        let resolver = ConfigurationResolver::new()
            .with_overrides(PropertyMap::new().with("mode", "Fastest"));

        let err = resolver.resolve().unwrap_err();
        let ConfigError::InvalidConfigurationValue { key, value, .. } = err;
        assert_eq!(key, "mode");
        assert_eq!(value, "Fastest");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let resolver = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("measurement.iterations", "lots"));
        assert!(resolver.resolve().is_err());

        let resolver = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("timeout", "5 fortnights"));
        assert!(resolver.resolve().is_err());
    }

    #[test]
    fn test_enum_options() {
        let resolver = ConfigurationResolver::new().with_overrides(
            PropertyMap::new()
                .with("mode", "avgt")
                .with("warmup.mode", "bulk_indi"),
        );
        let config = resolver.resolve().unwrap();
        assert_eq!(config.mode, Some(Mode::AverageTime));
        assert_eq!(config.warmup_mode, Some(WarmupMode::BulkIndi));
    }

    #[test]
    fn test_declared_mode() {
        let class = ClassDecl::new("a.B").annotate(Annotation::BenchmarkMode(Mode::SampleTime));
        let config = ConfigurationResolver::new().resolve_for(&class, None).unwrap();
        assert_eq!(config.mode, Some(Mode::SampleTime));
    }

    #[test]
    fn test_project_version_ignores_invalid_keys() {
        let resolver = ConfigurationResolver::new()
            .with_overrides(PropertyMap::new().with("forks", "many"))
            .with_source(PropertyMap::new().with("project.version", " 1.11.0 "));

        assert!(resolver.resolve().is_err());
        assert_eq!(resolver.project_version().as_deref(), Some("1.11.0"));
    }

    #[test]
    fn test_enabled_flag() {
        let disabled = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("enabled", "FALSE"));
        assert!(!disabled.resolve_enabled().unwrap());

        let broken = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("enabled", "sometimes"));
        assert!(broken.resolve_enabled().is_err());
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(ConfigKey::WarmupBatchSize.env_var(), "BENCHGATE_WARMUP_BATCH_SIZE");
        assert_eq!(ConfigKey::Enabled.env_var(), "BENCHGATE_ENABLED");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            PropertyMap::parse_assignment("mode=thrpt").unwrap(),
            ("mode".to_string(), "thrpt".to_string())
        );
        assert!(PropertyMap::parse_assignment("mode").is_err());
        assert!(PropertyMap::parse_assignment("=x").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3s").unwrap(), (false, Duration::from_secs(3)));
        assert_eq!(parse_duration("500ms").unwrap(), (false, Duration::from_millis(500)));
        assert_eq!(parse_duration("2m").unwrap(), (false, Duration::from_secs(120)));
        assert_eq!(parse_duration("10").unwrap(), (false, Duration::from_secs(10)));
        assert!(parse_duration("-1s").unwrap().0);
        assert!(parse_duration("xs").is_err());
    }

    #[test]
    fn test_out_of_range_duration_is_an_error() {
        assert!(parse_duration("99999999999999999999999").is_err());
        assert!(parse_duration("inf").is_err());

        let resolver = ConfigurationResolver::new()
            .with_source(PropertyMap::new().with("measurement.time", "99999999999999999999999"));
        let ConfigError::InvalidConfigurationValue { key, .. } = resolver.resolve().unwrap_err();
        assert_eq!(key, "measurement.time");
    }

    #[test]
    fn test_config_file_flattens_properties() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
            [properties]
            warmup.iterations = 5
            measurement.time = "2s"
            publish.uri = ["stdout:", "json:"]
            suite = "nightly"
            "#,
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let file = ConfigFile::discover_from(&nested).unwrap();
        assert_eq!(file.property("warmup.iterations").as_deref(), Some("5"));

        let resolver = ConfigurationResolver::new().with_source(file);
        let config = resolver.resolve().unwrap();
        assert_eq!(config.warmup_iterations, Some(5));
        assert_eq!(config.measurement_time, Some(Duration::from_secs(2)));
        assert_eq!(config.publish_uri.as_deref(), Some("stdout:,json:"));
        assert_eq!(resolver.configuration_parameters().get("suite"), Some("nightly"));
    }

    #[test]
    fn test_overrides_win_in_parameters() {
        let resolver = ConfigurationResolver::new()
            .with_overrides(PropertyMap::new().with("suite", "weekly"))
            .with_source(PropertyMap::new().with("suite", "nightly").with("extra", "1"));

        let params = resolver.configuration_parameters();
        assert_eq!(params.get("suite"), Some("weekly"));
        assert_eq!(params.get("extra"), Some("1"));
    }
}
