//! Provides the main entry point to the program.
use anyhow::Result;
use offgrid_lcoe::cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
