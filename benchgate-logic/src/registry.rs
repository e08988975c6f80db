//! Extension Registry
//!
//! Registries chain by value: a child registry is a fresh list holding the
//! parent's entries followed by the extensions declared on the child element.
//! The parent is never touched.

use crate::conditions::{
    DisabledCondition, EnvironmentVariableCondition, OsCondition, PropertyCondition,
};
use benchgate_core::{AnnotatedElement, Annotation, ExecutionCondition, Extension, ExtensionType};
use fxhash::FxHashSet;
use std::sync::Arc;

/// An instantiated extension together with its declared type
#[derive(Debug, Clone)]
pub struct RegisteredExtension {
    extension_type: ExtensionType,
    instance: Arc<dyn Extension>,
}

impl RegisteredExtension {
    /// Declared type
    pub fn extension_type(&self) -> ExtensionType {
        self.extension_type
    }

    /// Type name
    pub fn name(&self) -> &'static str {
        self.extension_type.name()
    }

    /// The instance
    pub fn extension(&self) -> &dyn Extension {
        self.instance.as_ref()
    }
}

/// Ordered extensions of one descriptor node
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    entries: Vec<RegisteredExtension>,
}

impl ExtensionRegistry {
    /// Registry without any extension
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root registry holding the built-in conditions
    pub fn with_default_extensions() -> Self {
        Self::empty().with_extensions([
            ExtensionType::of::<DisabledCondition>(),
            ExtensionType::of::<OsCondition>(),
            ExtensionType::of::<EnvironmentVariableCondition>(),
            ExtensionType::of::<PropertyCondition>(),
        ])
    }

    /// New registry: `self` followed by `types` not yet registered
    pub fn with_extensions(&self, types: impl IntoIterator<Item = ExtensionType>) -> Self {
        let mut seen: FxHashSet<&'static str> = self.entries.iter().map(|e| e.name()).collect();
        let mut entries = self.entries.clone();

        for extension_type in types {
            if !seen.insert(extension_type.name()) {
                tracing::trace!(
                    extension = extension_type.name(),
                    "extension already registered, skipping"
                );
                continue;
            }
            entries.push(RegisteredExtension {
                extension_type,
                instance: extension_type.instantiate(),
            });
        }

        Self { entries }
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an extension type with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name() == name)
    }

    /// Registered extensions in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredExtension> {
        self.entries.iter()
    }

    /// Type names in evaluation order
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    /// Condition-bearing extensions in evaluation order
    pub fn conditions(&self) -> impl Iterator<Item = (&'static str, &dyn ExecutionCondition)> {
        self.entries
            .iter()
            .filter_map(|e| e.extension().as_condition().map(|c| (e.name(), c)))
    }
}

/// Extension types declared on an element, across repeated `ExtendWith`
/// annotations, in declaration order
pub fn declared_extension_types<E: AnnotatedElement + ?Sized>(element: &E) -> Vec<ExtensionType> {
    element
        .annotations()
        .iter()
        .filter_map(|a| match a {
            Annotation::ExtendWith(types) => Some(types.iter().copied()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Child registry for `element`: the parent's extensions, then the newly declared ones
pub fn build_child_registry<E: AnnotatedElement + ?Sized>(
    parent: &ExtensionRegistry,
    element: &E,
) -> ExtensionRegistry {
    parent.with_extensions(declared_extension_types(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgate_core::{ClassDecl, MethodDecl};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct First;
    impl Extension for First {}

    #[derive(Debug, Default)]
    struct Second;
    impl Extension for Second {}

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Counted;
    impl Extension for Counted {}

    fn counted() -> Arc<dyn Extension> {
        CREATED.fetch_add(1, Ordering::SeqCst);
        Arc::new(Counted)
    }

    #[test]
    fn test_child_appends_after_parent() {
        let parent = ExtensionRegistry::empty().with_extensions([ExtensionType::of::<First>()]);
        let class = ClassDecl::new("org.example.Codec")
            .annotate(Annotation::ExtendWith(vec![ExtensionType::of::<Second>()]));

        let child = build_child_registry(&parent, &class);

        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);
        let names = child.extension_names();
        assert!(names[0].ends_with("First"));
        assert!(names[1].ends_with("Second"));
    }

    #[test]
    fn test_repeated_extend_with_preserves_order() {
        let method = MethodDecl::benchmark("encode")
            .annotate(Annotation::ExtendWith(vec![ExtensionType::of::<Second>()]))
            .annotate(Annotation::ExtendWith(vec![ExtensionType::of::<First>()]));

        let types = declared_extension_types(&method);
        assert_eq!(types, vec![ExtensionType::of::<Second>(), ExtensionType::of::<First>()]);
    }

    #[test]
    fn test_duplicate_type_not_registered_twice() {
        let parent = ExtensionRegistry::empty().with_extensions([ExtensionType::of::<First>()]);
        let method = MethodDecl::benchmark("encode")
            .annotate(Annotation::ExtendWith(vec![ExtensionType::of::<First>()]));

        let child = build_child_registry(&parent, &method);
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn test_parent_instances_are_reused() {
        let counted_type = ExtensionType::new("Counted", counted);
        let before = CREATED.load(Ordering::SeqCst);

        let parent = ExtensionRegistry::empty().with_extensions([counted_type]);
        let _child = build_child_registry(&parent, &ClassDecl::new("org.example.Plain"));

        assert_eq!(CREATED.load(Ordering::SeqCst) - before, 1);
    }

    #[test]
    fn test_default_extensions_are_conditions() {
        let registry = ExtensionRegistry::with_default_extensions();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.conditions().count(), 4);
    }
}
