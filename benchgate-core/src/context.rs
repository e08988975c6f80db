//! Extension Context
//!
//! What a condition sees of the node it is evaluating: the underlying class or
//! method, its annotations, configuration parameters and the chain of ancestor
//! contexts.

use crate::element::{AnnotatedElement, Annotation, ClassDecl, MethodDecl};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key/value configuration parameters visible to conditions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationParameters {
    values: BTreeMap<String, String>,
}

impl ConfigurationParameters {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameter is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigurationParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Element a context is bound to
#[derive(Debug, Clone)]
pub enum ElementRef {
    /// The engine root, no element
    Root,
    /// A benchmark class
    Class(Arc<ClassDecl>),
    /// A benchmark method and its declaring class
    Method {
        /// Declaring class
        class: Arc<ClassDecl>,
        /// The method
        method: Arc<MethodDecl>,
    },
}

/// Execution context of one descriptor node
#[derive(Debug)]
pub struct ExtensionContext {
    unique_id: String,
    display_name: String,
    element: ElementRef,
    parent: Option<Arc<ExtensionContext>>,
    configuration: Arc<ConfigurationParameters>,
}

impl ExtensionContext {
    /// Context of the root node
    pub fn root(unique_id: impl Into<String>, configuration: Arc<ConfigurationParameters>) -> Self {
        let unique_id = unique_id.into();
        Self {
            display_name: unique_id.clone(),
            unique_id,
            element: ElementRef::Root,
            parent: None,
            configuration,
        }
    }

    /// Context of a child node; configuration is inherited from `parent`
    pub fn child(
        parent: &Arc<ExtensionContext>,
        unique_id: impl Into<String>,
        display_name: impl Into<String>,
        element: ElementRef,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            display_name: display_name.into(),
            element,
            parent: Some(Arc::clone(parent)),
            configuration: Arc::clone(&parent.configuration),
        }
    }

    /// Unique id of the node
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Display name of the node
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Bound element
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    /// Class of a class or method node
    pub fn class(&self) -> Option<&ClassDecl> {
        match &self.element {
            ElementRef::Root => None,
            ElementRef::Class(class) | ElementRef::Method { class, .. } => Some(class),
        }
    }

    /// Method of a method node
    pub fn method(&self) -> Option<&MethodDecl> {
        match &self.element {
            ElementRef::Method { method, .. } => Some(method),
            _ => None,
        }
    }

    /// Annotations declared directly on the bound element
    pub fn annotations(&self) -> &[Annotation] {
        match &self.element {
            ElementRef::Root => &[],
            ElementRef::Class(class) => class.annotations(),
            ElementRef::Method { method, .. } => method.annotations(),
        }
    }

    /// Parent context
    pub fn parent(&self) -> Option<&Arc<ExtensionContext>> {
        self.parent.as_ref()
    }

    /// Ancestor contexts, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &ExtensionContext> {
        std::iter::successors(self.parent.as_deref(), |ctx| ctx.parent.as_deref())
    }

    /// Topmost context
    pub fn root_context(&self) -> &ExtensionContext {
        self.ancestors().last().unwrap_or(self)
    }

    /// Configuration parameter lookup
    pub fn configuration_parameter(&self, key: &str) -> Option<&str> {
        self.configuration.get(key)
    }
}
