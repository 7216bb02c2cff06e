//! Dependency graph construction
//!
//! Edges are inferred from output references: if node B's inputs (or
//! expression) reference node A, the graph records B → A. The builder
//! rejects cycles before any materialization happens and fixes the
//! evaluation order up front.

use crate::error::{GraphError, Result};
use strata_core::{NodeHandle, Registry};
use tracing::debug;

/// Immutable dependency graph over a registry
///
/// Read-only after build; the evaluator walks it without further
/// coordination.
#[derive(Debug)]
pub struct DependencyGraph {
    order: Vec<NodeHandle>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Build the graph from declared references
    ///
    /// Linear in nodes + edges. Fails with
    /// [`GraphError::CyclicDependency`] if any node reaches itself; a
    /// self-reference is a cycle of length one.
    pub fn build(registry: &Registry) -> Result<Self> {
        let node_count = registry.len();
        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut edge_count = 0;

        for (handle, node) in registry.iter() {
            let from = handle.index();
            for reference in node.references() {
                let to = reference.node.index();
                // Handles are plain indices; reject ones that never came
                // out of this registry before they can corrupt the graph.
                if to >= node_count {
                    return Err(GraphError::UnknownReference {
                        node: node.name.clone(),
                        index: to,
                    });
                }
                // Multiple references to the same node collapse into one edge.
                if !dependencies[from].contains(&to) {
                    dependencies[from].push(to);
                    dependents[to].push(from);
                    edge_count += 1;
                }
            }
        }

        let order = topological_order(&dependencies, &dependents)
            .ok_or_else(|| cyclic_dependency_error(registry, &dependencies))?;

        debug!(
            nodes = node_count,
            edges = edge_count,
            "Built dependency graph"
        );

        Ok(Self {
            order,
            dependencies,
            dependents,
            edge_count,
        })
    }

    /// Topological order; ties among simultaneously ready nodes break by
    /// declaration order, so the order is deterministic for a given
    /// registry.
    pub fn order(&self) -> &[NodeHandle] {
        &self.order
    }

    /// Nodes that `handle` references (must resolve before it)
    pub fn dependencies(&self, handle: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.dependencies[handle.index()]
            .iter()
            .map(|&index| NodeHandle::from_index(index))
    }

    /// Nodes that reference `handle` (may start once it resolves)
    pub fn dependents(&self, handle: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        self.dependents[handle.index()]
            .iter()
            .map(|&index| NodeHandle::from_index(index))
    }

    /// Number of unresolved dependencies per node, indexed by declaration
    /// order; the evaluator's starting counters.
    pub fn dependency_counts(&self) -> Vec<usize> {
        self.dependencies.iter().map(Vec::len).collect()
    }

    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Kahn's algorithm with a min-heap on declaration index for the
/// documented tie-break. Returns `None` when a cycle prevents completion.
fn topological_order(
    dependencies: &[Vec<usize>],
    dependents: &[Vec<usize>],
) -> Option<Vec<NodeHandle>> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    let node_count = dependencies.len();
    let mut remaining: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = remaining
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count == 0)
        .map(|(index, _)| Reverse(index))
        .collect();

    let mut order = Vec::with_capacity(node_count);
    while let Some(Reverse(index)) = ready.pop() {
        order.push(NodeHandle::from_index(index));
        for &dependent in &dependents[index] {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    (order.len() == node_count).then_some(order)
}

/// Depth-first search with a recursion-stack set, run only on failure to
/// name the offending cycle in the error.
fn cyclic_dependency_error(registry: &Registry, dependencies: &[Vec<usize>]) -> GraphError {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let node_count = dependencies.len();
    let mut marks = vec![Mark::Unvisited; node_count];

    for start in 0..node_count {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut path: Vec<usize> = vec![start];
        marks[start] = Mark::OnStack;

        while let Some(&mut (node, ref mut next_edge)) = stack.last_mut() {
            if *next_edge < dependencies[node].len() {
                let target = dependencies[node][*next_edge];
                *next_edge += 1;

                match marks[target] {
                    Mark::Unvisited => {
                        marks[target] = Mark::OnStack;
                        stack.push((target, 0));
                        path.push(target);
                    }
                    Mark::OnStack => {
                        let entry = path.iter().position(|&p| p == target).unwrap_or(0);
                        let names: Vec<&str> = path[entry..]
                            .iter()
                            .chain(std::iter::once(&target))
                            .map(|&index| node_name(registry, index))
                            .collect();
                        return GraphError::CyclicDependency(names.join(" -> "));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
                path.pop();
            }
        }
    }

    // Kahn only fails on cycles, so the search above must find one.
    GraphError::CyclicDependency("<unlocated>".to_string())
}

fn node_name(registry: &Registry, index: usize) -> &str {
    registry.node(NodeHandle::from_index(index)).name.as_str()
}
