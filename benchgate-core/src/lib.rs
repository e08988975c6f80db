#![warn(missing_docs)]
//! Benchgate Core - Element Model and Boundaries
//!
//! This crate provides the vocabulary shared by every other benchgate crate:
//! - Candidate classes, methods and their declared annotations
//! - `BenchmarkClass`, the immutable per-class discovery record
//! - Extension and execution-condition traits, plus the per-node `ExtensionContext`
//! - The engine boundary: `RunOptions` in, `BenchmarkResults` or `EngineError` out

mod context;
mod element;
mod engine;
mod extension;

pub use context::{ConfigurationParameters, ElementRef, ExtensionContext};
pub use element::{
    AnnotatedElement, Annotation, BenchmarkClass, ClassDecl, IterationSettings, MethodDecl, Os,
};
pub use engine::{
    BenchmarkEngine, BenchmarkRecord, BenchmarkResults, EngineError, Mode, RunOptions, WarmupMode,
};
pub use extension::{
    ConditionError, ConditionEvaluationResult, ExecutionCondition, Extension, ExtensionType,
};
