//! Benchmark Discovery
//!
//! Builds the descriptor tree from candidate classes supplied by the host.
//!
//! Selection rules:
//! - Only methods annotated as benchmarks are kept
//! - An optional regex filter matches `<class>.<method>`
//! - Classes left without methods are omitted, not kept as empty nodes
//! - A repeated class name keeps its first occurrence
//!
//! Ordering follows the candidate sequence, then method declaration order, so
//! discovering the same input twice yields the same tree.

use crate::descriptor::{DescriptorTree, NodeKind};
use benchgate_core::{BenchmarkClass, ClassDecl, ConfigurationParameters, MethodDecl};
use benchgate_logic::ExtensionRegistry;
use fxhash::{FxHashMap, FxHashSet};
use regex::Regex;
use std::sync::Arc;

/// Discovery inputs besides the candidates
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    filter: Option<Regex>,
    root_registry: ExtensionRegistry,
    configuration: ConfigurationParameters,
}

impl DiscoveryRequest {
    /// Request with the built-in conditions and no filter
    pub fn new() -> Self {
        Self {
            filter: None,
            root_registry: ExtensionRegistry::with_default_extensions(),
            configuration: ConfigurationParameters::new(),
        }
    }

    /// Keep only benchmarks whose `<class>.<method>` name matches
    pub fn with_filter(mut self, filter: Regex) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Replace the registry every class registry derives from
    pub fn with_root_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.root_registry = registry;
        self
    }

    /// Parameters visible to conditions through the execution context
    pub fn with_configuration(mut self, configuration: ConfigurationParameters) -> Self {
        self.configuration = configuration;
        self
    }
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover with the built-in conditions and no filter
pub fn discover(candidates: impl IntoIterator<Item = ClassDecl>) -> DescriptorTree {
    discover_with(candidates, DiscoveryRequest::new())
}

/// Discover according to `request`
pub fn discover_with(
    candidates: impl IntoIterator<Item = ClassDecl>,
    request: DiscoveryRequest,
) -> DescriptorTree {
    let DiscoveryRequest {
        filter,
        root_registry,
        configuration,
    } = request;

    let mut tree = DescriptorTree::new(root_registry, configuration);
    let root = tree.root();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for candidate in candidates {
        if seen.contains(candidate.name()) {
            tracing::warn!(class = candidate.name(), "duplicate benchmark class ignored");
            continue;
        }

        let class_name = candidate.name().to_string();
        let selected = BenchmarkClass::create_filtered(candidate, |method| match &filter {
            Some(re) => re.is_match(&format!("{}.{}", class_name, method.name())),
            None => true,
        });
        let Some(class) = selected else {
            tracing::debug!(class = %class_name, "no benchmark methods, class omitted");
            continue;
        };
        seen.insert(class_name);

        let class = Arc::new(class);
        let class_id = tree.add_child(
            root,
            &format!("[class:{}]", class.name()),
            class.simple_name(),
            NodeKind::Class(Arc::clone(&class)),
        );

        for (method, segment) in class.methods().iter().zip(method_segments(class.methods())) {
            tree.add_child(
                class_id,
                &format!("[method:{}]", segment),
                method.name(),
                NodeKind::Method {
                    class: Arc::clone(&class),
                    method: Arc::clone(method),
                },
            );
        }
    }

    tracing::debug!(
        classes = tree.classes().len(),
        leaves = tree.leaves(root).len(),
        "discovery complete"
    );
    tree
}

/// Id segments for the methods of one class: the name, the signature when
/// names collide, and `#n` when signatures collide too
fn method_segments(methods: &[Arc<MethodDecl>]) -> Vec<String> {
    let mut names: FxHashMap<&str, usize> = FxHashMap::default();
    let mut signatures: FxHashMap<String, usize> = FxHashMap::default();
    for method in methods {
        *names.entry(method.name()).or_default() += 1;
        *signatures.entry(method.signature()).or_default() += 1;
    }

    let mut ordinals: FxHashMap<String, usize> = FxHashMap::default();
    methods
        .iter()
        .map(|method| {
            if names[method.name()] == 1 {
                return method.name().to_string();
            }
            let signature = method.signature();
            if signatures[&signature] == 1 {
                return signature;
            }
            let ordinal = ordinals.entry(signature.clone()).or_default();
            *ordinal += 1;
            format!("{}#{}", signature, ordinal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<ClassDecl> {
        vec![
            ClassDecl::new("org.example.Codec")
                .method(MethodDecl::benchmark("encode"))
                .method(MethodDecl::new("helper"))
                .method(MethodDecl::benchmark("decode")),
            ClassDecl::new("org.example.Empty").method(MethodDecl::new("helper")),
            ClassDecl::new("org.example.Overloads")
                .method(MethodDecl::benchmark("run").param("int"))
                .method(MethodDecl::benchmark("run").param("String"))
                .method(MethodDecl::benchmark("run"))
                .method(MethodDecl::benchmark("run")),
        ]
    }

    fn ids(tree: &DescriptorTree) -> Vec<String> {
        tree.leaves(tree.root())
            .into_iter()
            .map(|id| tree.unique_id(id).to_string())
            .collect()
    }

    #[test]
    fn test_class_without_benchmarks_is_omitted() {
        let tree = discover(candidates());
        let classes: Vec<_> = tree
            .classes()
            .iter()
            .map(|&id| tree.display_name(id).to_string())
            .collect();
        assert_eq!(classes, ["Codec", "Overloads"]);
    }

    #[test]
    fn test_method_order_and_ids() {
        let tree = discover(candidates());
        assert_eq!(
            ids(&tree),
            [
                "[engine:benchgate]/[class:org.example.Codec]/[method:encode]",
                "[engine:benchgate]/[class:org.example.Codec]/[method:decode]",
                "[engine:benchgate]/[class:org.example.Overloads]/[method:run(int)]",
                "[engine:benchgate]/[class:org.example.Overloads]/[method:run(String)]",
                "[engine:benchgate]/[class:org.example.Overloads]/[method:run()#1]",
                "[engine:benchgate]/[class:org.example.Overloads]/[method:run()#2]",
            ]
        );
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let first = discover(candidates());
        let second = discover(candidates());
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.len(), second.len());
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_filter() {
        let request = DiscoveryRequest::new().with_filter(Regex::new(r"Codec\.dec").unwrap());
        let tree = discover_with(candidates(), request);
        assert_eq!(
            ids(&tree),
            ["[engine:benchgate]/[class:org.example.Codec]/[method:decode]"]
        );
    }

    #[test]
    fn test_duplicate_class_keeps_first() {
        let tree = discover(vec![
            ClassDecl::new("a.B").method(MethodDecl::benchmark("first")),
            ClassDecl::new("a.B").method(MethodDecl::benchmark("second")),
        ]);
        assert_eq!(ids(&tree), ["[engine:benchgate]/[class:a.B]/[method:first]"]);
    }

    #[test]
    fn test_nothing_is_built_during_discovery() {
        let tree = discover(candidates());
        assert!(tree.leaves(tree.root()).iter().all(|&id| !tree.is_registry_built(id)));
    }
}
