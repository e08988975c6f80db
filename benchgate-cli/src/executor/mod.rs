//! Benchmark Executor
//!
//! Runs a discovered descriptor tree and turns the outcomes into a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DescriptorTree (from discovery)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Conditions, configuration, engine, publishing
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build RunReport from leaf outcomes
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Tree walk, leaf execution and per-class publishing
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;

// Re-export public API
pub use execution::{
    GLOBAL_DISABLED_REASON, LeafError, LeafOutcome, LeafState, Orchestrator,
};
pub use formatting::format_human_output;
pub use metadata::build_report_meta;
pub use report::build_report;
