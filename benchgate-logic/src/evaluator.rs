//! Condition Evaluation
//!
//! Walks a registry's conditions in order and stops at the first veto.
//! Conditions behind a veto never run: they may assume they only see nodes
//! that are going to execute.

use crate::registry::ExtensionRegistry;
use benchgate_core::{ConditionEvaluationResult, ExtensionContext};

/// Evaluates all conditions of a registry into one verdict
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Create an evaluator
    pub fn new() -> Self {
        Self
    }

    /// Combined verdict for `context`.
    ///
    /// A condition that errors counts as a veto whose reason is the error, so
    /// the tree walk stays total.
    pub fn evaluate(
        &self,
        registry: &ExtensionRegistry,
        context: &ExtensionContext,
    ) -> ConditionEvaluationResult {
        for (name, condition) in registry.conditions() {
            match condition.evaluate_execution_condition(context) {
                Ok(result) if result.is_disabled() => {
                    tracing::debug!(
                        node = context.unique_id(),
                        condition = name,
                        reason = result.reason().unwrap_or_default(),
                        "condition disabled node"
                    );
                    return result;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        node = context.unique_id(),
                        condition = name,
                        error = %e,
                        "condition evaluation failed"
                    );
                    return ConditionEvaluationResult::disabled(format!(
                        "Failed to evaluate condition [{}]: {}",
                        name, e
                    ));
                }
            }
        }

        ConditionEvaluationResult::enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::{
        Annotation, ClassDecl, ConditionError, ConfigurationParameters, ElementRef,
        ExecutionCondition, Extension, ExtensionType, Os,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context_for(class: ClassDecl) -> ExtensionContext {
        let root = Arc::new(ExtensionContext::root(
            "[engine:test]",
            Arc::new(ConfigurationParameters::new()),
        ));
        let name = class.simple_name().to_string();
        ExtensionContext::child(&root, "[engine:test]/[class:x]", name, ElementRef::Class(Arc::new(class)))
    }

    #[derive(Debug, Default)]
    struct AlwaysDisable;

    impl Extension for AlwaysDisable {
        fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
            Some(self)
        }
    }

    impl ExecutionCondition for AlwaysDisable {
        fn evaluate_execution_condition(
            &self,
            _context: &ExtensionContext,
        ) -> Result<ConditionEvaluationResult, ConditionError> {
            Ok(ConditionEvaluationResult::disabled("always"))
        }
    }

    static SPY_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Spy;

    impl Extension for Spy {
        fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
            Some(self)
        }
    }

    impl ExecutionCondition for Spy {
        fn evaluate_execution_condition(
            &self,
            _context: &ExtensionContext,
        ) -> Result<ConditionEvaluationResult, ConditionError> {
            SPY_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(ConditionEvaluationResult::enabled())
        }
    }

    #[derive(Debug, Default)]
    struct Exploding;

    impl Extension for Exploding {
        fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
            Some(self)
        }
    }

    impl ExecutionCondition for Exploding {
        fn evaluate_execution_condition(
            &self,
            _context: &ExtensionContext,
        ) -> Result<ConditionEvaluationResult, ConditionError> {
            Err(ConditionError::Failed("boom".to_string()))
        }
    }

    #[test]
    fn test_runs_without_condition() {
        let registry = ExtensionRegistry::with_default_extensions();
        let ctx = context_for(ClassDecl::new("org.example.Simple"));

        let result = ConditionEvaluator::new().evaluate(&registry, &ctx);
        assert!(!result.is_disabled());
        assert_eq!(result.reason(), None);
    }

    #[test]
    fn test_disabled_class() {
        let registry = ExtensionRegistry::with_default_extensions();
        let ctx = context_for(
            ClassDecl::new("org.example.Disabled").annotate(Annotation::Disabled { reason: None }),
        );

        assert!(ConditionEvaluator::new().evaluate(&registry, &ctx).is_disabled());
    }

    #[test]
    fn test_os_condition_disables_with_reason() {
        let registry = ExtensionRegistry::with_default_extensions();
        let target = if Os::current() == Os::Aix { Os::Windows } else { Os::Aix };
        let ctx = context_for(
            ClassDecl::new("org.example.AixOnly").annotate(Annotation::EnabledOnOs(vec![target])),
        );

        let result = ConditionEvaluator::new().evaluate(&registry, &ctx);
        assert!(result.is_disabled());
        assert!(result.reason().unwrap().starts_with("Disabled on operating system"));
    }

    #[test]
    fn test_short_circuits_on_first_veto() {
        let registry = ExtensionRegistry::empty()
            .with_extensions([ExtensionType::of::<AlwaysDisable>(), ExtensionType::of::<Spy>()]);
        let ctx = context_for(ClassDecl::new("org.example.Simple"));

        let before = SPY_CALLS.load(Ordering::SeqCst);
        let result = ConditionEvaluator::new().evaluate(&registry, &ctx);

        assert!(result.is_disabled());
        assert_eq!(result.reason(), Some("always"));
        assert_eq!(SPY_CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_error_becomes_disabled_with_reason() {
        let registry = ExtensionRegistry::empty().with_extensions([ExtensionType::of::<Exploding>()]);
        let ctx = context_for(ClassDecl::new("org.example.Simple"));

        let result = ConditionEvaluator::new().evaluate(&registry, &ctx);
        assert!(result.is_disabled());
        let reason = result.reason().unwrap();
        assert!(reason.starts_with("Failed to evaluate condition"));
        assert!(reason.ends_with("boom"));
    }
}
