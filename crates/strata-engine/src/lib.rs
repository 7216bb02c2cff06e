//! Strata evaluation engine
//!
//! Drives a declared registry through one evaluation pass: the graph
//! crate derives the DAG, the evaluator materializes nodes in dependency
//! order through the [`Materializer`] capability, and derived values are
//! rendered by the output resolver.
//!
//! ```text
//! declarations ──> Registry ──> DependencyGraph ──> Evaluator ──> Report
//!                                                      │
//!                                              trait Materializer
//!                                            (provider SDK, external)
//! ```
//!
//! Build-time errors (duplicate names, cycles) abort before any
//! materializer call; runtime failures are attributed to their node in
//! the [`EvaluationReport`].

pub mod error;
pub mod evaluator;
pub mod materializer;
pub mod report;
pub mod resolver;

// Re-exports
pub use error::{EngineError, MaterializationError, Result};
pub use evaluator::{Evaluator, FailurePolicy};
pub use materializer::{DryRunMaterializer, Materializer, ResolvedInputs};
pub use report::{EvaluationReport, NodeResult, ReportSummary};
pub use resolver::{OutputResolver, Resolution};

use std::sync::Arc;
use strata_core::Registry;
use strata_graph::DependencyGraph;

/// Options for a single evaluation pass
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub policy: FailurePolicy,
}

/// Build the graph and evaluate the whole registry
///
/// The single entry point for callers that do not need to hold on to the
/// graph: cycles and other build-time problems return an error before a
/// single materializer call; everything past that lands in the report.
pub async fn run(
    registry: &mut Registry,
    materializer: Arc<dyn Materializer>,
    options: RunOptions,
) -> Result<EvaluationReport> {
    let graph = DependencyGraph::build(registry)?;
    let evaluator = Evaluator::new(options.policy);
    Ok(evaluator.evaluate(registry, &graph, materializer).await)
}
