use crate::topology;
use colored::Colorize;
use strata_config::Config;
use strata_core::NodeKind;
use strata_graph::DependencyGraph;

/// Build the graph without materializing anything
pub fn handle(config: &Config, stack: &str) -> anyhow::Result<()> {
    let topology = topology::declare(config, stack)?;
    let graph = DependencyGraph::build(&topology.registry)?;

    let derived = topology
        .registry
        .iter()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Derived(_)))
        .count();
    let resources = topology.registry.len() - derived;

    println!(
        "{} stack '{}' is valid: {} resources, {} derived outputs, no cycles",
        "✓".green().bold(),
        stack,
        resources,
        derived
    );
    println!(
        "  {} edges across {} nodes",
        graph.edge_count(),
        graph.node_count()
    );
    Ok(())
}
