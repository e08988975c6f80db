#![warn(missing_docs)]
//! Benchgate Logic - Extension Registries and Conditions
//!
//! Decides whether a descriptor node may run.
//! Provides value-chained extension registries, the short-circuiting condition
//! evaluator and the built-in conditions every root registry starts with.

mod conditions;
mod evaluator;
mod registry;

pub use benchgate_core::ConditionError;
pub use conditions::{
    DisabledCondition, EnvironmentVariableCondition, OsCondition, PropertyCondition,
};
pub use evaluator::ConditionEvaluator;
pub use registry::{
    ExtensionRegistry, RegisteredExtension, build_child_registry, declared_extension_types,
};
