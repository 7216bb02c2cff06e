//! Topological evaluator
//!
//! Walks the dependency graph in topological order and materializes each
//! node once every node it references is resolved. Independent subgraphs
//! run concurrently: ready resource nodes are spawned as tokio tasks
//! (provider calls are I/O-bound), derived nodes render in-process. The
//! only data shared across concurrent materializations is the read-only
//! graph and the per-node write-once output slots.

use crate::error::MaterializationError;
use crate::materializer::{Materializer, ResolvedInputs};
use crate::report::{EvaluationReport, NodeResult};
use crate::resolver::{OutputResolver, Resolution};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use strata_core::{
    EvaluationState, Expression, Input, Inputs, NodeHandle, NodeKind, Outputs, Registry,
};
use strata_graph::DependencyGraph;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// What to do when a node's materialization fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop starting new nodes; in-flight materializations complete and
    /// already-resolved outputs stay readable. The default: partial
    /// application of the remaining graph risks inconsistent
    /// infrastructure.
    #[default]
    FailFast,

    /// Keep evaluating independent subgraphs and report every failure at
    /// the end. Dependents of a failed node never start.
    ContinueOnError,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::ContinueOnError => write!(f, "continue-on-error"),
        }
    }
}

/// Evaluates a built graph against a materializer
#[derive(Debug, Default)]
pub struct Evaluator {
    policy: FailurePolicy,
}

impl Evaluator {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Materialize every node reachable under the failure policy
    ///
    /// Build-time problems (cycles, duplicates) are gone by the time a
    /// graph exists, so this always yields a report; per-node failures
    /// are collected in it rather than returned.
    pub async fn evaluate(
        &self,
        registry: &mut Registry,
        graph: &DependencyGraph,
        materializer: Arc<dyn Materializer>,
    ) -> EvaluationReport {
        let node_count = registry.len();
        let remaining = graph.dependency_counts();
        let ready: VecDeque<usize> = (0..node_count).filter(|&i| remaining[i] == 0).collect();

        let pass = Pass {
            registry,
            graph,
            resolver: OutputResolver::new(node_count),
            materializer,
            policy: self.policy,
            remaining,
            ready,
            in_flight: JoinSet::new(),
            report: EvaluationReport::new(),
            halted: false,
        };
        pass.run().await
    }
}

/// Mutable state of a single evaluation pass
struct Pass<'a> {
    registry: &'a mut Registry,
    graph: &'a DependencyGraph,
    resolver: OutputResolver,
    materializer: Arc<dyn Materializer>,
    policy: FailurePolicy,
    /// Unresolved dependency count per node, by declaration index
    remaining: Vec<usize>,
    /// Nodes whose dependencies are all resolved, not yet started
    ready: VecDeque<usize>,
    in_flight: JoinSet<(usize, anyhow::Result<Outputs>)>,
    report: EvaluationReport,
    halted: bool,
}

impl Pass<'_> {
    async fn run(mut self) -> EvaluationReport {
        let started = Instant::now();
        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            policy = %self.policy,
            provider = self.materializer.name(),
            "Starting evaluation"
        );

        self.start_ready();
        while let Some(joined) = self.in_flight.join_next().await {
            match joined {
                Ok((index, result)) => {
                    self.finish(index, result.map_err(|e| format!("{e:#}")));
                }
                Err(join_error) => {
                    // A panicking materializer leaves no node identity
                    // behind; halt rather than guess.
                    error!(error = %join_error, "Materializer task aborted");
                    self.halted = true;
                }
            }
            self.start_ready();
        }

        for (_, node) in self.registry.iter() {
            if node.state() == EvaluationState::Pending {
                self.report.skipped.push(node.name.clone());
            }
        }
        self.report.duration_ms = started.elapsed().as_millis() as u64;
        info!(summary = %self.report.summary(), "Evaluation finished");
        self.report
    }

    /// Start every ready node; derived nodes complete synchronously and
    /// may ready further nodes, so this drains until a fixpoint.
    fn start_ready(&mut self) {
        while let Some(index) = self.ready.pop_front() {
            if self.halted {
                // Left Pending; reported as skipped at the end.
                continue;
            }

            let handle = NodeHandle::from_index(index);
            let kind = self.registry.node(handle).kind.clone();
            match kind {
                NodeKind::Resource {
                    resource_type,
                    inputs,
                } => self.start_resource(index, resource_type, inputs),
                NodeKind::Derived(expr) => self.start_derived(index, expr),
            }
        }
    }

    fn start_resource(&mut self, index: usize, resource_type: String, inputs: Inputs) {
        let handle = NodeHandle::from_index(index);
        let resolved = match self.resolve_inputs(&inputs) {
            Ok(resolved) => resolved,
            Err(message) => {
                self.registry.mark_resolving(handle);
                self.fail(index, message);
                return;
            }
        };

        let name = self.registry.node(handle).name.clone();
        debug!(node = %name, resource_type = %resource_type, "Materializing");
        self.registry.mark_resolving(handle);

        let materializer = self.materializer.clone();
        self.in_flight.spawn(async move {
            let result = materializer
                .materialize(&resource_type, &name, &resolved)
                .await;
            (index, result)
        });
    }

    fn start_derived(&mut self, index: usize, expr: Expression) {
        let handle = NodeHandle::from_index(index);
        self.registry.mark_resolving(handle);

        // Dependencies are resolved, so the only way a reference can be
        // unavailable is a missing output key on a resolved node.
        for reference in expr.references() {
            if let Err(e) = self.registry.resolve(reference) {
                self.fail(index, e.to_string());
                return;
            }
        }

        match self.resolver.resolve(index, &expr, self.registry) {
            Resolution::Ready(value) => {
                self.finish(index, Ok(Outputs::new().with("value", value)));
            }
            Resolution::Pending => {
                self.fail(index, "expression references unresolved outputs".to_string());
            }
        }
    }

    /// Substitute every reference with its resolved value
    fn resolve_inputs(&self, inputs: &Inputs) -> Result<ResolvedInputs, String> {
        let mut resolved = ResolvedInputs::new();
        for (key, input) in inputs {
            let value = match input {
                Input::Literal(value) => value.clone(),
                Input::Ref(reference) => {
                    self.registry.resolve(reference).map_err(|e| e.to_string())?
                }
            };
            resolved.insert(key.clone(), value);
        }
        Ok(resolved)
    }

    fn finish(&mut self, index: usize, result: Result<Outputs, String>) {
        let handle = NodeHandle::from_index(index);
        match result {
            Ok(outputs) => {
                if let Err(e) = self.registry.record_outputs(handle, outputs.clone()) {
                    self.fail(index, e.to_string());
                    return;
                }

                let node = self.registry.node(handle);
                info!(node = %node.name, "Resolved");
                self.report.outputs.insert(node.name.clone(), outputs);
                self.report.succeeded.push(NodeResult {
                    node: node.name.clone(),
                    resource_type: node.resource_type().map(str::to_string),
                    message: "resolved".to_string(),
                    error: None,
                });
                self.unblock_dependents(index);
            }
            Err(message) => self.fail(index, message),
        }
    }

    fn fail(&mut self, index: usize, message: String) {
        let handle = NodeHandle::from_index(index);
        self.registry.mark_failed(handle);

        let node = self.registry.node(handle);
        warn!(node = %node.name, error = %message, "Materialization failed");
        self.report.failed.push(NodeResult {
            node: node.name.clone(),
            resource_type: node.resource_type().map(str::to_string),
            message: String::new(),
            error: Some(MaterializationError {
                node: node.name.clone(),
                message,
            }),
        });

        if self.policy == FailurePolicy::FailFast {
            self.halted = true;
        }
    }

    fn unblock_dependents(&mut self, index: usize) {
        let handle = NodeHandle::from_index(index);
        for dependent in self.graph.dependents(handle) {
            let i = dependent.index();
            self.remaining[i] -= 1;
            if self.remaining[i] == 0 {
                self.ready.push_back(i);
            }
        }
    }
}
