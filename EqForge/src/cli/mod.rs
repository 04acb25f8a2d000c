//! EqForge CLI - convert EverQuest zone and object exports for the 3.3.5 client

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "eqforge")]
#[command(about = "EqForge: EverQuest geometry to WMO/M2/WDT/WDL converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the EqForge CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
