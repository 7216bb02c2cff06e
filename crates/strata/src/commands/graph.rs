use crate::topology;
use colored::Colorize;
use strata_config::Config;
use strata_graph::DependencyGraph;

/// Print the evaluation order with each node's dependencies
pub fn handle(config: &Config, stack: &str) -> anyhow::Result<()> {
    let topology = topology::declare(config, stack)?;
    let graph = DependencyGraph::build(&topology.registry)?;

    for (position, &handle) in graph.order().iter().enumerate() {
        let node = topology.registry.node(handle);
        let kind = node.resource_type().unwrap_or("derived");
        let dependencies: Vec<&str> = graph
            .dependencies(handle)
            .map(|dep| topology.registry.node(dep).name.as_str())
            .collect();

        if dependencies.is_empty() {
            println!("{:>3}. {} ({})", position + 1, node.name.bold(), kind);
        } else {
            println!(
                "{:>3}. {} ({}) {} {}",
                position + 1,
                node.name.bold(),
                kind,
                "←".dimmed(),
                dependencies.join(", ").dimmed()
            );
        }
    }

    println!();
    println!("{} nodes, {} edges", graph.node_count(), graph.edge_count());
    Ok(())
}
