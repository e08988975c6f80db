//! Execution Orchestration
//!
//! Walks the descriptor tree in pre-order. A disabled class skips its whole
//! subtree without evaluating anything below it; enabled leaves are evaluated
//! again at leaf level, then resolved, mapped to run options and handed to the
//! engine. A leaf failure is recorded and the walk moves on.
//!
//! After the leaves of a class finish, the completed results are aggregated,
//! written to the class report file and published once.

use crate::config::{BenchmarkConfiguration, ConfigError, ConfigurationResolver};
use crate::descriptor::{DescriptorTree, NodeId, NodeKind, NodeState};
use crate::options::{ReportFileError, build_run_options};
use benchgate_core::{
    BenchmarkClass, BenchmarkEngine, BenchmarkResults, ClassDecl, EngineError, MethodDecl, RunOptions,
};
use benchgate_logic::ConditionEvaluator;
use benchgate_report::{OutputChannel, PublishReport, ResultsPublisher, generate_results_json};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Skip reason when the global `enabled` property is false
pub const GLOBAL_DISABLED_REASON: &str = "Benchmarks disabled via configuration property 'enabled'";

/// Why a leaf failed
#[derive(Debug, Error)]
pub enum LeafError {
    /// Configuration did not resolve
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Report directory or file could not be prepared
    #[error(transparent)]
    ReportFile(#[from] ReportFileError),

    /// The engine failed or panicked
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LeafError {
    /// Short category name
    pub fn kind(&self) -> &'static str {
        match self {
            LeafError::Configuration(_) => "configuration",
            LeafError::ReportFile(_) => "report_file",
            LeafError::Engine(_) => "engine",
        }
    }
}

/// Terminal state of one leaf
#[derive(Debug)]
pub enum LeafState {
    /// Not run
    Skipped {
        /// Condition or configuration reason
        reason: String,
    },
    /// Engine returned results
    Completed(BenchmarkResults),
    /// Failed with an error
    Failed(LeafError),
}

impl LeafState {
    fn node_state(&self) -> NodeState {
        match self {
            LeafState::Skipped { .. } => NodeState::Skipped,
            LeafState::Completed(_) => NodeState::Completed,
            LeafState::Failed(_) => NodeState::Failed,
        }
    }

    /// Whether the engine returned results
    pub fn is_completed(&self) -> bool {
        matches!(self, LeafState::Completed(_))
    }

    /// Whether the leaf failed
    pub fn is_failed(&self) -> bool {
        matches!(self, LeafState::Failed(_))
    }

    /// Whether the leaf was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, LeafState::Skipped { .. })
    }
}

/// Outcome of one method leaf
#[derive(Debug)]
pub struct LeafOutcome {
    /// Leaf node in the tree
    pub node: NodeId,
    /// Unique id of the leaf
    pub unique_id: String,
    /// Fully qualified class name
    pub class_name: String,
    /// Method name
    pub method: String,
    /// Terminal state
    pub state: LeafState,
    /// Wall time spent on the leaf
    pub duration: Duration,
}

/// What a completed leaf leaves behind for its class
struct Executed {
    results: BenchmarkResults,
    options: RunOptions,
    config: BenchmarkConfiguration,
}

/// Drives a descriptor tree through the engine
pub struct Orchestrator<E> {
    engine: E,
    resolver: ConfigurationResolver,
    evaluator: ConditionEvaluator,
    publisher: ResultsPublisher,
    output: OutputChannel,
    date: NaiveDate,
    show_progress: bool,
    publish_reports: Vec<(String, PublishReport)>,
}

impl<E: BenchmarkEngine> Orchestrator<E> {
    /// Orchestrator publishing to the default sinks on stdout, dated today
    pub fn new(engine: E, resolver: ConfigurationResolver) -> Self {
        Self {
            engine,
            resolver,
            evaluator: ConditionEvaluator::new(),
            publisher: ResultsPublisher::with_default_sinks(),
            output: OutputChannel::stdout(),
            date: chrono::Local::now().date_naive(),
            show_progress: false,
            publish_reports: Vec::new(),
        }
    }

    /// Publisher used for `publish.uri`
    pub fn with_publisher(mut self, publisher: ResultsPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    /// Channel that stdout-like sinks print to
    pub fn with_output(mut self, output: OutputChannel) -> Self {
        self.output = output;
        self
    }

    /// Date used in report file names
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Show a progress bar while running
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The output channel
    pub fn output(&self) -> &OutputChannel {
        &self.output
    }

    /// Publish outcomes of the last run, per class name
    pub fn publish_reports(&self) -> &[(String, PublishReport)] {
        &self.publish_reports
    }

    /// Run every leaf of `tree`, returning outcomes in pre-order.
    ///
    /// A tree runs once. Running an already executed tree does nothing and
    /// returns no outcomes; discover again to repeat a run.
    pub fn run(&mut self, tree: &DescriptorTree) -> Vec<LeafOutcome> {
        self.publish_reports.clear();
        let root = tree.root();
        if tree.state(root) != NodeState::Pending {
            tracing::warn!(state = ?tree.state(root), "descriptor tree already executed, not running it again");
            return Vec::new();
        }
        let mut outcomes = Vec::new();

        match self.resolver.resolve_enabled() {
            Ok(false) => {
                tracing::info!("{}", GLOBAL_DISABLED_REASON);
                for &class in tree.classes() {
                    outcomes.extend(self.skip_subtree(tree, class, GLOBAL_DISABLED_REASON));
                }
                tree.set_state(root, NodeState::Skipped);
                return outcomes;
            }
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(error = %e, "cannot resolve global enabled switch, evaluating leaves individually");
            }
        }

        tree.set_state(root, NodeState::Running);
        let pb = self.progress_bar(tree.leaves(root).len() as u64);

        for &class in tree.classes() {
            outcomes.extend(self.run_class(tree, class, &pb));
        }

        pb.finish_with_message("Complete");
        tree.set_state(root, NodeState::Completed);
        outcomes
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    fn run_class(&mut self, tree: &DescriptorTree, class: NodeId, pb: &ProgressBar) -> Vec<LeafOutcome> {
        let verdict = self.evaluator.evaluate(&tree.registry(class), &tree.context(class));
        if verdict.is_disabled() {
            let reason = verdict
                .into_reason()
                .unwrap_or_else(|| format!("{} is disabled", tree.display_name(class)));
            let skipped = self.skip_subtree(tree, class, &reason);
            pb.inc(skipped.len() as u64);
            return skipped;
        }

        tree.set_state(class, NodeState::Running);
        let mut outcomes = Vec::new();
        let mut executed = Vec::new();

        for &leaf in tree.children(class) {
            let NodeKind::Method { class: declared, method } = tree.kind(leaf) else {
                continue;
            };
            pb.set_message(tree.unique_id(leaf).to_string());
            let (outcome, done) = self.run_leaf(tree, leaf, declared, method);
            outcomes.push(outcome);
            executed.extend(done);
            pb.inc(1);
        }

        self.finish_class(tree, class, executed);
        tree.set_state(class, NodeState::Completed);
        outcomes
    }

    fn run_leaf(
        &self,
        tree: &DescriptorTree,
        leaf: NodeId,
        class: &BenchmarkClass,
        method: &MethodDecl,
    ) -> (LeafOutcome, Option<Executed>) {
        let start = Instant::now();

        let verdict = self.evaluator.evaluate(&tree.registry(leaf), &tree.context(leaf));
        let (state, executed) = if verdict.is_disabled() {
            let reason = verdict
                .into_reason()
                .unwrap_or_else(|| format!("{} is disabled", tree.display_name(leaf)));
            tracing::info!(node = tree.unique_id(leaf), reason = %reason, "skipped");
            (LeafState::Skipped { reason }, None)
        } else {
            tree.set_state(leaf, NodeState::Running);
            match self.execute(class.class(), method, tree.unique_id(leaf)) {
                Ok(executed) => {
                    tracing::info!(
                        node = tree.unique_id(leaf),
                        records = executed.results.len(),
                        "completed"
                    );
                    (LeafState::Completed(executed.results.clone()), Some(executed))
                }
                Err(e) => {
                    tracing::warn!(node = tree.unique_id(leaf), error = %e, "failed");
                    (LeafState::Failed(e), None)
                }
            }
        };

        tree.set_state(leaf, state.node_state());
        let outcome = LeafOutcome {
            node: leaf,
            unique_id: tree.unique_id(leaf).to_string(),
            class_name: class.name().to_string(),
            method: method.name().to_string(),
            state,
            duration: start.elapsed(),
        };
        (outcome, executed)
    }

    fn execute(
        &self,
        class: &ClassDecl,
        method: &MethodDecl,
        unique_id: &str,
    ) -> Result<Executed, LeafError> {
        let config = self.resolver.resolve_for(class, Some(method))?;
        let options = build_run_options(&config, class, method, self.date)?;
        tracing::debug!(node = unique_id, include = %options.include, "invoking engine");
        let results = self.invoke_engine(&options)?;
        Ok(Executed {
            results,
            options,
            config,
        })
    }

    fn invoke_engine(&self, options: &RunOptions) -> Result<BenchmarkResults, EngineError> {
        match catch_unwind(AssertUnwindSafe(|| self.engine.invoke(options))) {
            Ok(result) => result,
            Err(panic) => Err(EngineError::Panicked(panic_message(panic.as_ref()))),
        }
    }

    fn skip_subtree(&self, tree: &DescriptorTree, node: NodeId, reason: &str) -> Vec<LeafOutcome> {
        tracing::info!(node = tree.unique_id(node), reason = %reason, "skipped with all descendants");
        tree.set_state(node, NodeState::Skipped);

        tree.leaves(node)
            .into_iter()
            .map(|leaf| {
                tree.set_state(leaf, NodeState::Skipped);
                let (class_name, method) = match tree.kind(leaf) {
                    NodeKind::Method { class, method } => {
                        (class.name().to_string(), method.name().to_string())
                    }
                    _ => (String::new(), tree.display_name(leaf).to_string()),
                };
                LeafOutcome {
                    node: leaf,
                    unique_id: tree.unique_id(leaf).to_string(),
                    class_name,
                    method,
                    state: LeafState::Skipped {
                        reason: reason.to_string(),
                    },
                    duration: Duration::ZERO,
                }
            })
            .collect()
    }

    /// Class report file and publishing over the completed leaves
    fn finish_class(&mut self, tree: &DescriptorTree, class: NodeId, executed: Vec<Executed>) {
        let Some(first) = executed.first() else {
            return;
        };
        let report_file = first.options.result_file.clone();
        let publish_uri = first.config.publish_uri.clone();

        let mut aggregate = BenchmarkResults::default();
        for done in executed {
            aggregate.merge(done.results);
        }

        if let Some(path) = report_file {
            let written = generate_results_json(&aggregate)
                .map_err(|e| e.to_string())
                .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
            match written {
                Ok(()) => tracing::debug!(path = %path.display(), "class report written"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "cannot write class report"),
            }
        }

        let report = self
            .publisher
            .publish(&mut self.output, &aggregate, publish_uri.as_deref());
        let class_name = match tree.kind(class) {
            NodeKind::Class(class) => class.name().to_string(),
            _ => tree.display_name(class).to_string(),
        };
        self.publish_reports.push((class_name, report));
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
