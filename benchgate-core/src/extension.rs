//! Extensions and Execution Conditions
//!
//! An extension is declared by type through `Annotation::ExtendWith` and only
//! instantiated when a registry for the declaring node is built.

use crate::context::ExtensionContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a condition while evaluating
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConditionError {
    /// The annotation driving the condition is malformed
    #[error("Invalid condition declaration: {0}")]
    InvalidDeclaration(String),

    /// The condition could not reach a verdict
    #[error("{0}")]
    Failed(String),
}

/// A plugin attached to a node's extension registry
pub trait Extension: Send + Sync + fmt::Debug {
    /// Condition capability of this extension, if it gates execution
    fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
        None
    }
}

/// Veto capability over a node and its subtree
pub trait ExecutionCondition: Send + Sync {
    /// Decide whether the node described by `context` may run
    fn evaluate_execution_condition(
        &self,
        context: &ExtensionContext,
    ) -> Result<ConditionEvaluationResult, ConditionError>;
}

/// Declared extension type, a factory that has not been instantiated yet
#[derive(Clone, Copy)]
pub struct ExtensionType {
    name: &'static str,
    factory: fn() -> Arc<dyn Extension>,
}

impl ExtensionType {
    /// Declare an extension type from a name and factory
    pub const fn new(name: &'static str, factory: fn() -> Arc<dyn Extension>) -> Self {
        Self { name, factory }
    }

    /// Declare an extension type instantiated through `Default`
    pub fn of<T: Extension + Default + 'static>() -> Self {
        Self::new(std::any::type_name::<T>(), instantiate_default::<T>)
    }

    /// Type name, unique per extension type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Create a new instance
    pub fn instantiate(&self) -> Arc<dyn Extension> {
        (self.factory)()
    }
}

fn instantiate_default<T: Extension + Default + 'static>() -> Arc<dyn Extension> {
    Arc::new(T::default())
}

impl fmt::Debug for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtensionType").field(&self.name).finish()
    }
}

impl PartialEq for ExtensionType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ExtensionType {}

/// Verdict of one condition, or of a whole registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEvaluationResult {
    disabled: bool,
    reason: Option<String>,
}

impl ConditionEvaluationResult {
    /// Enabled, no reason given
    pub fn enabled() -> Self {
        Self {
            disabled: false,
            reason: None,
        }
    }

    /// Enabled with an explanation
    pub fn enabled_because(reason: impl Into<String>) -> Self {
        Self {
            disabled: false,
            reason: Some(reason.into()),
        }
    }

    /// Disabled with an explanation
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            disabled: true,
            reason: Some(reason.into()),
        }
    }

    /// Whether execution is vetoed
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Human-readable reason, if any
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Consume into the reason
    pub fn into_reason(self) -> Option<String> {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Noop;

    impl Extension for Noop {}

    #[test]
    fn test_extension_type_identity() {
        let a = ExtensionType::of::<Noop>();
        let b = ExtensionType::of::<Noop>();
        assert_eq!(a, b);
        assert!(a.name().ends_with("Noop"));
        assert!(a.instantiate().as_condition().is_none());
    }

    #[test]
    fn test_result_constructors() {
        assert!(!ConditionEvaluationResult::enabled().is_disabled());
        assert_eq!(ConditionEvaluationResult::enabled().reason(), None);

        let r = ConditionEvaluationResult::disabled("nope");
        assert!(r.is_disabled());
        assert_eq!(r.reason(), Some("nope"));
    }
}
