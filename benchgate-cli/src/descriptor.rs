//! Descriptor Tree
//!
//! Arena of root, class and method nodes. Nodes refer to their parent by
//! index, so the tree owns every node exactly once. Registries and contexts
//! are built on first request and cached for the lifetime of the tree; asking
//! for a child's registry builds its ancestors' registries first.

use benchgate_core::{
    BenchmarkClass, ConfigurationParameters, ElementRef, ExtensionContext, MethodDecl,
};
use benchgate_logic::{ExtensionRegistry, build_child_registry};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Unique id of the engine root
pub const ROOT_ID: &str = "[engine:benchgate]";

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node stands for
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Engine root
    Root,
    /// Benchmark class container
    Class(Arc<BenchmarkClass>),
    /// Benchmark method leaf
    Method {
        /// Declaring class
        class: Arc<BenchmarkClass>,
        /// The benchmark method
        method: Arc<MethodDecl>,
    },
}

/// Execution state: `Pending -> {Skipped | Running -> {Completed | Failed}}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Not visited yet
    Pending,
    /// Currently executing
    Running,
    /// Disabled by a condition or configuration
    Skipped,
    /// Finished without error
    Completed,
    /// Finished with an error
    Failed,
}

impl NodeState {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::Skipped | NodeState::Completed | NodeState::Failed)
    }
}

#[derive(Debug)]
struct Node {
    unique_id: String,
    display_name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    registry: OnceLock<Arc<ExtensionRegistry>>,
    context: OnceLock<Arc<ExtensionContext>>,
    state: Mutex<NodeState>,
}

/// Discovered benchmark tree.
///
/// Node states only move forward, so a tree is executed at most once.
#[derive(Debug)]
pub struct DescriptorTree {
    nodes: Vec<Node>,
    root_registry: Arc<ExtensionRegistry>,
    configuration: Arc<ConfigurationParameters>,
}

impl DescriptorTree {
    /// Tree holding only the root node
    pub fn new(root_registry: ExtensionRegistry, configuration: ConfigurationParameters) -> Self {
        let root = Node {
            unique_id: ROOT_ID.to_string(),
            display_name: "benchgate".to_string(),
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            registry: OnceLock::new(),
            context: OnceLock::new(),
            state: Mutex::new(NodeState::Pending),
        };
        Self {
            nodes: vec![root],
            root_registry: Arc::new(root_registry),
            configuration: Arc::new(configuration),
        }
    }

    /// Attach a child; its id is the parent id followed by `/<segment>`
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        segment: &str,
        display_name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let unique_id = format!("{}/{}", self.node(parent).unique_id, segment);
        self.nodes.push(Node {
            unique_id,
            display_name: display_name.into(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
            registry: OnceLock::new(),
            context: OnceLock::new(),
            state: Mutex::new(NodeState::Pending),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Unique id, `[engine:benchgate]/[class:...]/[method:...]`
    pub fn unique_id(&self, id: NodeId) -> &str {
        &self.node(id).unique_id
    }

    /// Simple class name or method name
    pub fn display_name(&self, id: NodeId) -> &str {
        &self.node(id).display_name
    }

    /// What the node stands for
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Parent node, `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children in declaration order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Class nodes in discovery order
    pub fn classes(&self) -> &[NodeId] {
        self.children(self.root())
    }

    /// Method leaves below `id`, pre-order
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(id, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.node(id).kind, NodeKind::Method { .. }) {
            out.push(id);
        }
        for &child in &self.node(id).children {
            self.collect_leaves(child, out);
        }
    }

    /// Look a node up by unique id
    pub fn find(&self, unique_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.unique_id == unique_id)
            .map(NodeId)
    }

    /// Extension registry of `id`, built on first request
    pub fn registry(&self, id: NodeId) -> Arc<ExtensionRegistry> {
        let node = self.node(id);
        let registry = node.registry.get_or_init(|| {
            let Some(parent) = node.parent else {
                return Arc::clone(&self.root_registry);
            };
            let parent_registry = self.registry(parent);
            let registry = match &node.kind {
                NodeKind::Root => (*parent_registry).clone(),
                NodeKind::Class(class) => build_child_registry(&parent_registry, class.class().as_ref()),
                NodeKind::Method { method, .. } => build_child_registry(&parent_registry, method.as_ref()),
            };
            tracing::trace!(node = %node.unique_id, extensions = registry.len(), "registry built");
            Arc::new(registry)
        });
        Arc::clone(registry)
    }

    /// Whether the registry of `id` has been built
    pub fn is_registry_built(&self, id: NodeId) -> bool {
        self.node(id).registry.get().is_some()
    }

    /// Execution context of `id`, built on first request
    pub fn context(&self, id: NodeId) -> Arc<ExtensionContext> {
        let node = self.node(id);
        let context = node.context.get_or_init(|| {
            let Some(parent) = node.parent else {
                return Arc::new(ExtensionContext::root(
                    node.unique_id.clone(),
                    Arc::clone(&self.configuration),
                ));
            };
            let element = match &node.kind {
                NodeKind::Root => ElementRef::Root,
                NodeKind::Class(class) => ElementRef::Class(Arc::clone(class.class())),
                NodeKind::Method { class, method } => ElementRef::Method {
                    class: Arc::clone(class.class()),
                    method: Arc::clone(method),
                },
            };
            Arc::new(ExtensionContext::child(
                &self.context(parent),
                node.unique_id.clone(),
                node.display_name.clone(),
                element,
            ))
        });
        Arc::clone(context)
    }

    /// Current execution state
    pub fn state(&self, id: NodeId) -> NodeState {
        *self
            .node(id)
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, id: NodeId, state: NodeState) {
        let mut current = self
            .node(id)
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        debug_assert!(!current.is_terminal(), "node {} already finished", self.node(id).unique_id);
        *current = state;
    }

    /// Indented listing with unique ids
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root(), 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let _ = writeln!(
            out,
            "{:indent$}{} {}",
            "",
            node.display_name,
            node.unique_id,
            indent = depth * 2
        );
        for &child in &node.children {
            self.render_node(child, depth + 1, out);
        }
    }
}
