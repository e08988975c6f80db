//! Run-options mapping and report files
//!
//! Translates a resolved [`BenchmarkConfiguration`] into engine-facing
//! [`RunOptions`]. Times are forwarded in whole seconds; anything that rounds
//! to zero stays unset.

use crate::config::BenchmarkConfiguration;
use benchgate_core::{ClassDecl, MethodDecl, RunOptions};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// The report directory or file could not be prepared
#[derive(Debug, Error)]
#[error("Cannot prepare report file {}: {source}", path.display())]
pub struct ReportFileError {
    /// Path that failed
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

/// `[<version>_]<yyyy-MM-dd>_<SimpleClassName>.json`
pub fn report_filename(project_version: Option<&str>, date: NaiveDate, simple_class_name: &str) -> String {
    let mut name = String::new();
    if let Some(version) = project_version.map(str::trim).filter(|v| !v.is_empty()) {
        name.push_str(version);
        name.push('_');
    }
    name.push_str(&date.format("%Y-%m-%d").to_string());
    name.push('_');
    name.push_str(simple_class_name);
    name.push_str(".json");
    name
}

/// Report path for `class`, if a report directory is configured
pub fn report_path(config: &BenchmarkConfiguration, class: &ClassDecl, date: NaiveDate) -> Option<PathBuf> {
    let dir = config.report_dir.as_ref()?;
    Some(dir.join(report_filename(
        config.project_version.as_deref(),
        date,
        class.simple_name(),
    )))
}

/// Remove a stale report of the same name, or create its directory and an empty file
pub fn prepare_report_file(path: &Path) -> Result<(), ReportFileError> {
    let wrap = |source| ReportFileError {
        path: path.to_path_buf(),
        source,
    };

    if path.exists() {
        std::fs::remove_file(path).map_err(wrap)?;
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(wrap)?;
        }
        std::fs::File::create(path).map_err(wrap)?;
    }
    Ok(())
}

fn whole_seconds(duration: Option<Duration>) -> Option<Duration> {
    duration
        .map(|d| Duration::from_secs(d.as_secs()))
        .filter(|d| !d.is_zero())
}

/// Engine options for one method, preparing the report file when configured
pub fn build_run_options(
    config: &BenchmarkConfiguration,
    class: &ClassDecl,
    method: &MethodDecl,
    date: NaiveDate,
) -> Result<RunOptions, ReportFileError> {
    let result_file = match report_path(config, class, date) {
        Some(path) => {
            prepare_report_file(&path)?;
            Some(path)
        }
        None => None,
    };

    Ok(RunOptions {
        include: format!("{}.{}", class.name(), method.name()),
        class_name: class.name().to_string(),
        method_name: method.name().to_string(),
        warmup_iterations: config.warmup_iterations,
        warmup_time: whole_seconds(config.warmup_time),
        warmup_batch_size: config.warmup_batch_size,
        warmup_mode: config.warmup_mode,
        measurement_iterations: config.measurement_iterations,
        measurement_time: whole_seconds(config.measurement_time),
        measurement_batch_size: config.measurement_batch_size,
        timeout: whole_seconds(config.timeout),
        mode: config.mode,
        forks: config.forks,
        result_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::Mode;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 3, 7).unwrap()
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            report_filename(Some("1.11.0"), date(), "MappingMongoConverterBenchmark"),
            "1.11.0_2017-03-07_MappingMongoConverterBenchmark.json"
        );
        assert_eq!(
            report_filename(None, date(), "MappingMongoConverterBenchmark"),
            "2017-03-07_MappingMongoConverterBenchmark.json"
        );
        assert_eq!(
            report_filename(Some("  "), date(), "Simple"),
            "2017-03-07_Simple.json"
        );
    }

    #[test]
    fn test_options_without_report_dir() {
        let config = BenchmarkConfiguration {
            warmup_iterations: Some(3),
            warmup_time: Some(Duration::from_millis(500)),
            measurement_time: Some(Duration::from_millis(2500)),
            mode: Some(Mode::Throughput),
            ..Default::default()
        };
        let class = ClassDecl::new("org.example.Codec");
        let method = MethodDecl::benchmark("encode");

        let options = build_run_options(&config, &class, &method, date()).unwrap();
        assert_eq!(options.include, "org.example.Codec.encode");
        assert_eq!(options.warmup_iterations, Some(3));
        assert_eq!(options.warmup_time, None);
        assert_eq!(options.measurement_time, Some(Duration::from_secs(2)));
        assert_eq!(options.result_file, None);
    }

    #[test]
    fn test_report_file_is_created_then_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchmarkConfiguration {
            report_dir: Some(dir.path().join("reports")),
            project_version: Some("2.0.0".to_string()),
            ..Default::default()
        };
        let class = ClassDecl::new("org.example.Codec");
        let method = MethodDecl::benchmark("encode");

        let options = build_run_options(&config, &class, &method, date()).unwrap();
        let path = options.result_file.unwrap();
        assert_eq!(path, dir.path().join("reports").join("2.0.0_2017-03-07_Codec.json"));
        assert!(path.exists());

        std::fs::write(&path, "stale").unwrap();
        build_run_options(&config, &class, &method, date()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_report_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let config = BenchmarkConfiguration {
            report_dir: Some(blocker.join("reports")),
            ..Default::default()
        };

        let err = build_run_options(
            &config,
            &ClassDecl::new("a.B"),
            &MethodDecl::benchmark("m"),
            date(),
        )
        .unwrap_err();
        assert!(err.path.ends_with("reports/2017-03-07_B.json"));
    }
}
