//! Annotated Element Model
//!
//! Benchmark classes and methods as handed over by the host platform's scanner.
//! Every element carries an ordered list of declared [`Annotation`]s; nothing here
//! is reflective, the host builds these declarations once and they stay immutable.

use crate::engine::Mode;
use crate::extension::ExtensionType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Operating systems recognised by OS conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux
    Linux,
    /// macOS
    Mac,
    /// Windows
    Windows,
    /// IBM AIX
    Aix,
    /// Solaris and illumos
    Solaris,
    /// FreeBSD
    FreeBsd,
    /// OpenBSD
    OpenBsd,
    /// Anything else
    Other,
}

impl Os {
    /// Operating system of the running process
    pub fn current() -> Os {
        Os::from_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name
    pub fn from_name(name: &str) -> Os {
        match name.to_ascii_lowercase().as_str() {
            "linux" => Os::Linux,
            "macos" | "mac" | "darwin" => Os::Mac,
            "windows" => Os::Windows,
            "aix" => Os::Aix,
            "solaris" | "illumos" => Os::Solaris,
            "freebsd" => Os::FreeBsd,
            "openbsd" => Os::OpenBsd,
            _ => Os::Other,
        }
    }

    /// Whether this is the operating system of the running process
    pub fn is_current(self) -> bool {
        self == Os::current()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Linux => "LINUX",
            Os::Mac => "MAC",
            Os::Windows => "WINDOWS",
            Os::Aix => "AIX",
            Os::Solaris => "SOLARIS",
            Os::FreeBsd => "FREEBSD",
            Os::OpenBsd => "OPENBSD",
            Os::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// Iteration settings declared through `Warmup` / `Measurement` annotations.
///
/// Zero or negative values mean "not declared" and never reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationSettings {
    /// Number of iterations
    pub iterations: i32,
    /// Duration of each iteration
    pub time: Duration,
    /// Batch size (operations per invocation)
    pub batch_size: i32,
}

impl IterationSettings {
    /// Settings with only an iteration count
    pub fn iterations(iterations: i32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Set the per-iteration time
    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: i32) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// A declaration attached to a class or method
#[derive(Debug, Clone)]
pub enum Annotation {
    /// Marks a method as a benchmark
    Benchmark,
    /// Unconditionally disables the element
    Disabled {
        /// Optional custom reason
        reason: Option<String>,
    },
    /// Enabled only on the listed operating systems
    EnabledOnOs(Vec<Os>),
    /// Disabled on the listed operating systems
    DisabledOnOs(Vec<Os>),
    /// Enabled only if the environment variable matches the regex
    EnabledIfEnvironmentVariable {
        /// Variable name
        named: String,
        /// Regular expression the whole value must match
        matches: String,
    },
    /// Disabled if the environment variable matches the regex
    DisabledIfEnvironmentVariable {
        /// Variable name
        named: String,
        /// Regular expression the whole value must match
        matches: String,
    },
    /// Enabled only if the configuration parameter matches the regex
    EnabledIfProperty {
        /// Parameter key
        named: String,
        /// Regular expression the whole value must match
        matches: String,
    },
    /// Disabled if the configuration parameter matches the regex
    DisabledIfProperty {
        /// Parameter key
        named: String,
        /// Regular expression the whole value must match
        matches: String,
    },
    /// Registers extensions for this element and everything below it (repeatable)
    ExtendWith(Vec<ExtensionType>),
    /// Declared warmup defaults
    Warmup(IterationSettings),
    /// Declared measurement defaults
    Measurement(IterationSettings),
    /// Declared fork count
    Fork(i32),
    /// Declared run timeout
    Timeout(Duration),
    /// Declared benchmark mode
    BenchmarkMode(Mode),
}

/// Anything that carries declared annotations
pub trait AnnotatedElement {
    /// Annotations in declaration order
    fn annotations(&self) -> &[Annotation];

    /// First annotation for which `f` returns `Some`
    fn find_annotation<'a, T>(&'a self, f: impl FnMut(&'a Annotation) -> Option<T>) -> Option<T> {
        self.annotations().iter().find_map(f)
    }

    /// Whether the element is annotated as a benchmark
    fn is_benchmark(&self) -> bool {
        self.annotations()
            .iter()
            .any(|a| matches!(a, Annotation::Benchmark))
    }
}

/// A method declared on a candidate class
#[derive(Debug, Clone)]
pub struct MethodDecl {
    name: String,
    parameter_types: Vec<String>,
    annotations: Vec<Annotation>,
}

impl MethodDecl {
    /// A plain method without annotations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// A method annotated as a benchmark
    pub fn benchmark(name: impl Into<String>) -> Self {
        Self::new(name).annotate(Annotation::Benchmark)
    }

    /// Append a parameter type to the signature
    pub fn param(mut self, type_name: impl Into<String>) -> Self {
        self.parameter_types.push(type_name.into());
        self
    }

    /// Append an annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type names in declaration order
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// `name(type,type)` signature
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameter_types.join(","))
    }
}

impl AnnotatedElement for MethodDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A candidate class supplied by the host scanner
#[derive(Debug, Clone)]
pub struct ClassDecl {
    name: String,
    annotations: Vec<Annotation>,
    methods: Vec<MethodDecl>,
}

impl ClassDecl {
    /// A class with the given fully qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Append an annotation
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Append a method
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// Fully qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without package/module qualification.
    ///
    /// Accepts `.`, `::` and `$` separated names.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(['.', ':', '$'])
            .next()
            .unwrap_or(&self.name)
    }

    /// All declared methods in declaration order
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// Methods annotated as benchmarks, in declaration order
    pub fn benchmark_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter().filter(|m| m.is_benchmark())
    }
}

impl AnnotatedElement for ClassDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// One discovered class under benchmark.
///
/// Created once per class that declares at least one benchmark method and
/// never mutated afterwards.
#[derive(Debug)]
pub struct BenchmarkClass {
    class: Arc<ClassDecl>,
    methods: Vec<Arc<MethodDecl>>,
    extensions: Vec<ExtensionType>,
}

impl BenchmarkClass {
    /// Build from a candidate class; `None` if it declares no benchmark methods
    pub fn create(class: ClassDecl) -> Option<Self> {
        Self::create_filtered(class, |_| true)
    }

    /// Build keeping only benchmark methods accepted by `select`
    pub fn create_filtered(class: ClassDecl, mut select: impl FnMut(&MethodDecl) -> bool) -> Option<Self> {
        let methods: Vec<_> = class
            .benchmark_methods()
            .filter(|m| select(m))
            .cloned()
            .map(Arc::new)
            .collect();

        if methods.is_empty() {
            return None;
        }

        let extensions = class
            .annotations()
            .iter()
            .filter_map(|a| match a {
                Annotation::ExtendWith(types) => Some(types.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();

        Some(Self {
            class: Arc::new(class),
            methods,
            extensions,
        })
    }

    /// Underlying class declaration
    pub fn class(&self) -> &Arc<ClassDecl> {
        &self.class
    }

    /// Fully qualified class name
    pub fn name(&self) -> &str {
        self.class.name()
    }

    /// Simple class name
    pub fn simple_name(&self) -> &str {
        self.class.simple_name()
    }

    /// Benchmark methods in declaration order
    pub fn methods(&self) -> &[Arc<MethodDecl>] {
        &self.methods
    }

    /// Extension types declared directly on the class
    pub fn extensions(&self) -> &[ExtensionType] {
        &self.extensions
    }
}
