//! Built-in Execution Conditions
//!
//! Registered in every root registry. Each one inspects only the annotations
//! declared directly on the element it is evaluating; inheritance comes from
//! the descriptor tree evaluating parents first.

use benchgate_core::{
    Annotation, ConditionError, ConditionEvaluationResult, ExecutionCondition, Extension,
    ExtensionContext, Os,
};
use regex::Regex;

/// Honours `Annotation::Disabled`
#[derive(Debug, Default)]
pub struct DisabledCondition;

impl Extension for DisabledCondition {
    fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
        Some(self)
    }
}

impl ExecutionCondition for DisabledCondition {
    fn evaluate_execution_condition(
        &self,
        context: &ExtensionContext,
    ) -> Result<ConditionEvaluationResult, ConditionError> {
        let disabled = context.annotations().iter().find_map(|a| match a {
            Annotation::Disabled { reason } => Some(reason),
            _ => None,
        });

        Ok(match disabled {
            Some(Some(reason)) if !reason.trim().is_empty() => {
                ConditionEvaluationResult::disabled(reason.clone())
            }
            Some(_) => {
                ConditionEvaluationResult::disabled(format!("{} is disabled", context.display_name()))
            }
            None => ConditionEvaluationResult::enabled_because("No disabled annotation present"),
        })
    }
}

/// Honours `Annotation::EnabledOnOs` and `Annotation::DisabledOnOs`
#[derive(Debug)]
pub struct OsCondition {
    current: Os,
}

impl OsCondition {
    /// Condition checking against a fixed operating system
    pub fn for_os(current: Os) -> Self {
        Self { current }
    }
}

impl Default for OsCondition {
    fn default() -> Self {
        Self::for_os(Os::current())
    }
}

impl Extension for OsCondition {
    fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
        Some(self)
    }
}

impl ExecutionCondition for OsCondition {
    fn evaluate_execution_condition(
        &self,
        context: &ExtensionContext,
    ) -> Result<ConditionEvaluationResult, ConditionError> {
        for annotation in context.annotations() {
            match annotation {
                Annotation::EnabledOnOs(systems) => {
                    if systems.is_empty() {
                        return Err(ConditionError::InvalidDeclaration(
                            "EnabledOnOs requires at least one operating system".to_string(),
                        ));
                    }
                    if !systems.contains(&self.current) {
                        return Ok(self.disabled());
                    }
                }
                Annotation::DisabledOnOs(systems) => {
                    if systems.is_empty() {
                        return Err(ConditionError::InvalidDeclaration(
                            "DisabledOnOs requires at least one operating system".to_string(),
                        ));
                    }
                    if systems.contains(&self.current) {
                        return Ok(self.disabled());
                    }
                }
                _ => {}
            }
        }

        Ok(ConditionEvaluationResult::enabled_because(format!(
            "Enabled on operating system: {}",
            self.current
        )))
    }
}

impl OsCondition {
    fn disabled(&self) -> ConditionEvaluationResult {
        ConditionEvaluationResult::disabled(format!("Disabled on operating system: {}", self.current))
    }
}

/// Honours the environment-variable annotations
#[derive(Debug, Default)]
pub struct EnvironmentVariableCondition;

impl Extension for EnvironmentVariableCondition {
    fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
        Some(self)
    }
}

impl ExecutionCondition for EnvironmentVariableCondition {
    fn evaluate_execution_condition(
        &self,
        context: &ExtensionContext,
    ) -> Result<ConditionEvaluationResult, ConditionError> {
        for annotation in context.annotations() {
            let (named, matches, enable) = match annotation {
                Annotation::EnabledIfEnvironmentVariable { named, matches } => (named, matches, true),
                Annotation::DisabledIfEnvironmentVariable { named, matches } => {
                    (named, matches, false)
                }
                _ => continue,
            };
            let value = std::env::var(named).ok();
            if let Some(result) =
                match_gate("Environment variable", named, matches, value.as_deref(), enable)?
            {
                return Ok(result);
            }
        }

        Ok(ConditionEvaluationResult::enabled_because(
            "No environment variable condition vetoed execution",
        ))
    }
}

/// Honours the configuration-parameter annotations
#[derive(Debug, Default)]
pub struct PropertyCondition;

impl Extension for PropertyCondition {
    fn as_condition(&self) -> Option<&dyn ExecutionCondition> {
        Some(self)
    }
}

impl ExecutionCondition for PropertyCondition {
    fn evaluate_execution_condition(
        &self,
        context: &ExtensionContext,
    ) -> Result<ConditionEvaluationResult, ConditionError> {
        for annotation in context.annotations() {
            let (named, matches, enable) = match annotation {
                Annotation::EnabledIfProperty { named, matches } => (named, matches, true),
                Annotation::DisabledIfProperty { named, matches } => (named, matches, false),
                _ => continue,
            };
            let value = context.configuration_parameter(named);
            if let Some(result) = match_gate("Configuration parameter", named, matches, value, enable)? {
                return Ok(result);
            }
        }

        Ok(ConditionEvaluationResult::enabled_because(
            "No configuration parameter condition vetoed execution",
        ))
    }
}

/// Shared regex gate. `Some` carries a disabling verdict, `None` lets evaluation continue.
fn match_gate(
    kind: &str,
    named: &str,
    pattern: &str,
    value: Option<&str>,
    enable_on_match: bool,
) -> Result<Option<ConditionEvaluationResult>, ConditionError> {
    if named.trim().is_empty() {
        return Err(ConditionError::InvalidDeclaration(format!(
            "{} name must not be blank",
            kind
        )));
    }
    let re = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
        ConditionError::InvalidDeclaration(format!("Invalid regular expression [{}]: {}", pattern, e))
    })?;

    let Some(value) = value else {
        return Ok(enable_on_match
            .then(|| ConditionEvaluationResult::disabled(format!("{} [{}] does not exist", kind, named))));
    };

    let matched = re.is_match(value);
    Ok(match (enable_on_match, matched) {
        (true, false) => Some(ConditionEvaluationResult::disabled(format!(
            "{} [{}] with value [{}] does not match regular expression [{}]",
            kind, named, value, pattern
        ))),
        (false, true) => Some(ConditionEvaluationResult::disabled(format!(
            "{} [{}] with value [{}] matches regular expression [{}]",
            kind, named, value, pattern
        ))),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::{ClassDecl, ConfigurationParameters, ElementRef};
    use std::sync::Arc;

    fn class_context(class: ClassDecl, params: ConfigurationParameters) -> ExtensionContext {
        let root = Arc::new(ExtensionContext::root("[engine:test]", Arc::new(params)));
        let name = class.simple_name().to_string();
        ExtensionContext::child(&root, "[engine:test]/[class:x]", name, ElementRef::Class(Arc::new(class)))
    }

    #[test]
    fn test_disabled_with_reason() {
        let ctx = class_context(
            ClassDecl::new("org.example.Slow").annotate(Annotation::Disabled {
                reason: Some("too slow for CI".to_string()),
            }),
            ConfigurationParameters::new(),
        );

        let result = DisabledCondition.evaluate_execution_condition(&ctx).unwrap();
        assert!(result.is_disabled());
        assert_eq!(result.reason(), Some("too slow for CI"));
    }

    #[test]
    fn test_disabled_without_reason_names_element() {
        let ctx = class_context(
            ClassDecl::new("org.example.Slow").annotate(Annotation::Disabled { reason: None }),
            ConfigurationParameters::new(),
        );

        let result = DisabledCondition.evaluate_execution_condition(&ctx).unwrap();
        assert_eq!(result.reason(), Some("Slow is disabled"));
    }

    #[test]
    fn test_os_condition() {
        let ctx = class_context(
            ClassDecl::new("org.example.AixOnly").annotate(Annotation::EnabledOnOs(vec![Os::Aix])),
            ConfigurationParameters::new(),
        );

        let on_linux = OsCondition::for_os(Os::Linux)
            .evaluate_execution_condition(&ctx)
            .unwrap();
        assert!(on_linux.is_disabled());
        assert!(on_linux.reason().unwrap().starts_with("Disabled on operating system"));

        let on_aix = OsCondition::for_os(Os::Aix)
            .evaluate_execution_condition(&ctx)
            .unwrap();
        assert!(!on_aix.is_disabled());
    }

    #[test]
    fn test_disabled_on_os() {
        let ctx = class_context(
            ClassDecl::new("org.example.NoWindows")
                .annotate(Annotation::DisabledOnOs(vec![Os::Windows])),
            ConfigurationParameters::new(),
        );

        assert!(
            OsCondition::for_os(Os::Windows)
                .evaluate_execution_condition(&ctx)
                .unwrap()
                .is_disabled()
        );
        assert!(
            !OsCondition::for_os(Os::Linux)
                .evaluate_execution_condition(&ctx)
                .unwrap()
                .is_disabled()
        );
    }

    #[test]
    fn test_empty_os_list_is_an_error() {
        let ctx = class_context(
            ClassDecl::new("org.example.Broken").annotate(Annotation::EnabledOnOs(vec![])),
            ConfigurationParameters::new(),
        );
        assert!(OsCondition::default().evaluate_execution_condition(&ctx).is_err());
    }

    #[test]
    fn test_missing_environment_variable_disables() {
        let ctx = class_context(
            ClassDecl::new("org.example.Ci").annotate(Annotation::EnabledIfEnvironmentVariable {
                named: "BENCHGATE_TEST_SURELY_UNSET_VARIABLE".to_string(),
                matches: "true".to_string(),
            }),
            ConfigurationParameters::new(),
        );

        let result = EnvironmentVariableCondition
            .evaluate_execution_condition(&ctx)
            .unwrap();
        assert!(result.is_disabled());
        assert!(result.reason().unwrap().contains("does not exist"));
    }

    #[test]
    fn test_property_condition() {
        let params: ConfigurationParameters = [("suite", "nightly")].into_iter().collect();
        let enabled_if = |pattern: &str| {
            class_context(
                ClassDecl::new("org.example.Nightly").annotate(Annotation::EnabledIfProperty {
                    named: "suite".to_string(),
                    matches: pattern.to_string(),
                }),
                params.clone(),
            )
        };

        let matching = PropertyCondition
            .evaluate_execution_condition(&enabled_if("night.*"))
            .unwrap();
        assert!(!matching.is_disabled());

        let other = PropertyCondition
            .evaluate_execution_condition(&enabled_if("weekly"))
            .unwrap();
        assert!(other.is_disabled());
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let ctx = class_context(
            ClassDecl::new("org.example.Broken").annotate(Annotation::DisabledIfProperty {
                named: "suite".to_string(),
                matches: "(".to_string(),
            }),
            [("suite", "x")].into_iter().collect(),
        );
        assert!(PropertyCondition.evaluate_execution_condition(&ctx).is_err());
    }
}
