//! EqForge command-line entry point

fn main() -> anyhow::Result<()> {
    eqforge::cli::run_cli()
}
