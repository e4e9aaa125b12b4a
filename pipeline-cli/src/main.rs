// azpipe
// Build-step tooling for pipeline-core definitions

mod commands;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "azpipe")]
#[command(version, about = "Build-step tooling for typed Azure DevOps pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate typed parameter accessors from a parameters schema
    Accessors(commands::accessors::AccessorsArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Accessors(args) => commands::accessors::execute(args),
    }
}

/// Logs go to stderr so generated source can be piped from stdout
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "azpipe=info,pipeline_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
