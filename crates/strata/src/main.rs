mod commands;
mod topology;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Declarative resource-graph deployments", long_about = None)]
#[command(version)]
struct Cli {
    /// Stack name; its first 9 characters prefix every resource name
    #[arg(short, long, global = true, env = "STRATA_STACK", default_value = "dev")]
    stack: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the stack and materialize every resource
    Deploy {
        /// Keep evaluating independent resources after a failure
        /// (default is fail-fast)
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the dependency graph in evaluation order
    Graph,
    /// Build the dependency graph without materializing anything
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let config = match strata_config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Deploy { keep_going } => {
            let ok = commands::deploy::handle(&config, &cli.stack, keep_going).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Graph => commands::graph::handle(&config, &cli.stack)?,
        Commands::Validate => commands::validate::handle(&config, &cli.stack)?,
    }

    Ok(())
}
