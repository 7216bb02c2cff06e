//! Strata dependency graph
//!
//! Turns a declared [`Registry`](strata_core::Registry) into an immutable
//! DAG: output references become edges, cycles are rejected up front, and
//! the topological evaluation order is computed once.

pub mod dag;
pub mod error;

// Re-exports
pub use dag::DependencyGraph;
pub use error::{GraphError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Expression, Input, Registry};

    fn no_inputs() -> Vec<(String, Input)> {
        Vec::new()
    }

    #[test]
    fn infers_edges_from_references() {
        let mut registry = Registry::new();
        let rg = registry
            .declare("rg", "resource-group", no_inputs())
            .unwrap();
        let sa = registry
            .declare(
                "sa",
                "storage-account",
                vec![(
                    "resource_group_name".to_string(),
                    Input::from(registry.output(rg, "name")),
                )],
            )
            .unwrap();

        let graph = DependencyGraph::build(&registry).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies(sa).collect::<Vec<_>>(), vec![rg]);
        assert_eq!(graph.dependents(rg).collect::<Vec<_>>(), vec![sa]);
    }

    #[test]
    fn order_respects_dependencies() {
        let mut registry = Registry::new();
        // Declare out of dependency order on purpose.
        let app = registry.declare("app", "app-service", no_inputs()).unwrap();
        let rg = registry
            .declare("rg", "resource-group", no_inputs())
            .unwrap();
        let plan = registry
            .declare(
                "plan",
                "app-service-plan",
                vec![(
                    "resource_group_name".to_string(),
                    Input::from(registry.output(rg, "name")),
                )],
            )
            .unwrap();

        let endpoint = registry
            .derive(
                "endpoint",
                Expression::new()
                    .lit("https://")
                    .output(registry.output(app, "hostname"))
                    .lit("/")
                    .output(registry.output(plan, "id")),
            )
            .unwrap();

        let graph = DependencyGraph::build(&registry).unwrap();
        let order = graph.order();

        let position = |h| order.iter().position(|&o| o == h).unwrap();
        assert!(position(rg) < position(plan));
        assert!(position(plan) < position(endpoint));
        assert!(position(app) < position(endpoint));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn ready_ties_break_by_declaration_order() {
        let mut registry = Registry::new();
        let b = registry.declare("b", "resource-group", no_inputs()).unwrap();
        let a = registry.declare("a", "resource-group", no_inputs()).unwrap();
        let c = registry.declare("c", "resource-group", no_inputs()).unwrap();

        let graph = DependencyGraph::build(&registry).unwrap();
        assert_eq!(graph.order(), &[b, a, c]);
    }

    #[test]
    fn duplicate_references_collapse_to_one_edge() {
        let mut registry = Registry::new();
        let sql = registry.declare("sql", "sql-server", no_inputs()).unwrap();
        registry
            .derive(
                "conn",
                Expression::new()
                    .lit("Server=")
                    .output(registry.output(sql, "name"))
                    .lit(";catalog=")
                    .output(registry.output(sql, "name")),
            )
            .unwrap();

        let graph = DependencyGraph::build(&registry).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn reference_to_unknown_node_fails_build() {
        let mut registry = Registry::new();
        // Only one node exists; index 7 never came out of this registry.
        registry
            .declare(
                "sa",
                "storage-account",
                vec![(
                    "resource_group_name".to_string(),
                    Input::from(strata_core::OutputRef {
                        node: strata_core::NodeHandle::from_index(7),
                        key: "name".to_string(),
                    }),
                )],
            )
            .unwrap();

        let err = DependencyGraph::build(&registry).unwrap_err();
        assert!(matches!(err, GraphError::UnknownReference { ref node, index: 7 } if node == "sa"));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut registry = Registry::new();
        // A node referencing its own output: handles are declaration
        // indices, and "a" lands at index 0.
        registry
            .declare(
                "a",
                "resource-group",
                vec![(
                    "self".to_string(),
                    Input::from(strata_core::OutputRef {
                        node: strata_core::NodeHandle::from_index(0),
                        key: "name".to_string(),
                    }),
                )],
            )
            .unwrap();

        let err = DependencyGraph::build(&registry).unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency(path) if path == "a -> a"));
    }

    #[test]
    fn mutual_reference_is_a_cycle() {
        let mut registry = Registry::new();
        // b does not exist yet, but handles are plain indices; declare a
        // referencing the node that will land at index 1.
        let a = registry
            .declare(
                "a",
                "resource-group",
                vec![(
                    "peer".to_string(),
                    Input::from(strata_core::OutputRef {
                        node: strata_core::NodeHandle::from_index(1),
                        key: "name".to_string(),
                    }),
                )],
            )
            .unwrap();
        registry
            .declare(
                "b",
                "resource-group",
                vec![(
                    "peer".to_string(),
                    Input::from(registry.output(a, "name")),
                )],
            )
            .unwrap();

        match DependencyGraph::build(&registry).unwrap_err() {
            GraphError::CyclicDependency(path) => {
                assert!(path.contains("a") && path.contains("b"), "path: {path}");
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }
}
