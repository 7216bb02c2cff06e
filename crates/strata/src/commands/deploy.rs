use crate::topology;
use colored::Colorize;
use std::sync::Arc;
use strata_config::Config;
use strata_engine::{DryRunMaterializer, FailurePolicy, RunOptions};

/// Evaluate the stack; returns `false` if any node failed or was skipped
pub async fn handle(config: &Config, stack: &str, keep_going: bool) -> anyhow::Result<bool> {
    let policy = if keep_going {
        FailurePolicy::ContinueOnError
    } else {
        FailurePolicy::FailFast
    };

    println!(
        "{} (policy: {})",
        format!("Deploying stack '{stack}'...").blue().bold(),
        policy
    );

    let topology = topology::declare(config, stack)?;
    let mut registry = topology.registry;

    let materializer = Arc::new(DryRunMaterializer::new());
    let report = strata_engine::run(&mut registry, materializer, RunOptions { policy }).await?;

    println!();
    for result in &report.succeeded {
        let kind = result.resource_type.as_deref().unwrap_or("derived");
        println!("  {} {} ({})", "✓".green(), result.node, kind.dimmed());
    }
    for result in &report.failed {
        let message = result
            .error
            .as_ref()
            .map(|e| e.message.as_str())
            .unwrap_or("unknown error");
        println!("  {} {}: {}", "✗".red().bold(), result.node, message.red());
    }
    for name in &report.skipped {
        println!("  {} {} {}", "·".dimmed(), name, "(skipped)".dimmed());
    }

    println!();
    println!("{} in {}ms", report.summary(), report.duration_ms);

    if !report.is_success() {
        return Ok(false);
    }

    // The connection string stays out of the console; it contains the
    // SQL password and is wired into the app service inputs instead.
    let endpoint = registry.resolve(&registry.output(topology.endpoint, "value"))?;
    println!(
        "endpoint: {}",
        endpoint.as_str().unwrap_or_default().cyan()
    );
    Ok(true)
}
