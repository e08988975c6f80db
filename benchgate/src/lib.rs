#![warn(missing_docs)]
//! # Benchgate
//!
//! Condition-gated benchmark orchestration: discovers benchmark methods on
//! annotated classes, decides which may run, resolves their configuration and
//! drives an external benchmarking engine, publishing the results to sinks.
//!
//! - **Descriptor Tree**: root → classes → method leaves with stable unique ids
//! - **Inherited Conditions**: value-chained extension registries, first veto wins
//! - **Layered Configuration**: overrides, environment, `benchgate.toml`, annotations
//! - **Failure Isolation**: a failing leaf or sink never stops its siblings
//!
//! ## Quick Start
//!
//! ```ignore
//! use benchgate::prelude::*;
//!
//! let candidates = vec![
//!     ClassDecl::new("org.example.CodecBenchmark")
//!         .annotate(Annotation::DisabledOnOs(vec![Os::Windows]))
//!         .method(MethodDecl::benchmark("encode")),
//! ];
//!
//! let engine = |options: &RunOptions| -> Result<BenchmarkResults, EngineError> {
//!     run_external_engine(options)
//! };
//!
//! benchgate::run(candidates, engine)?;
//! ```

// Re-export core types
pub use benchgate_core::{
    AnnotatedElement, Annotation, BenchmarkClass, BenchmarkEngine, BenchmarkRecord,
    BenchmarkResults, ClassDecl, ConditionError, ConditionEvaluationResult,
    ConfigurationParameters, ElementRef, EngineError, ExecutionCondition, Extension,
    ExtensionContext, ExtensionType, IterationSettings, MethodDecl, Mode, Os, RunOptions,
    WarmupMode,
};

// Re-export logic types
pub use benchgate_logic::{
    ConditionEvaluator, DisabledCondition, EnvironmentVariableCondition, ExtensionRegistry,
    OsCondition, PropertyCondition, build_child_registry,
};

// Re-export report types
pub use benchgate_report::{
    LeafStatus, OutputChannel, OutputFormat, PublishReport, ResultsPublisher, ResultsSink,
    RunReport, SinkError, SinkRegistry, SinkResolver, SinkStatus, generate_json_report,
};

// Re-export orchestration
pub use benchgate_cli::{
    BenchmarkConfiguration, Cli, ConfigError, ConfigFile, ConfigKey, ConfigurationResolver,
    DescriptorTree, DiscoveryRequest, EnvironmentSource, GLOBAL_DISABLED_REASON, LeafError,
    LeafOutcome, LeafState, NodeId, NodeState, Orchestrator, PropertyMap, PropertySource, ROOT_ID,
    build_report, build_report_meta, discover, discover_with, report_filename, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Annotation, BenchmarkEngine, BenchmarkRecord, BenchmarkResults, ClassDecl, EngineError,
        Extension, ExecutionCondition, ExtensionType, IterationSettings, MethodDecl, Mode, Os,
        RunOptions,
    };
}

/// Run the Benchgate CLI harness.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     benchgate::run(candidates(), engine)
/// }
/// ```
pub use benchgate_cli::run;
