//! The command line interface for the evaluation engine.
use crate::input::load_model;
use crate::log;
use crate::output::{create_output_directory, write_frontier, write_metrics, write_sensitivity};
use crate::ranking::{
    candidates_with_lcoe, capital_cost_sensitivity, evaluate_designs,
    lifetime_renewable_percentage, lowest_lcoe_candidate, pareto_frontier,
};
use ::log::info;
use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// The command line interface for the evaluation engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Commands,
    /// The log level to use (e.g. error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Options selecting which candidates to price
#[derive(Args)]
pub struct SelectOpts {
    /// The location to select candidates from
    #[arg(short, long)]
    pub location: String,
    /// The natural gas capacity the candidates must have (MW, rounded)
    #[arg(short, long)]
    pub gas_capacity_mw: f64,
}

/// Options for commands that write CSV output
#[derive(Args)]
pub struct OutputOpts {
    /// Directory for output files
    #[arg(short, long, default_value = "results")]
    pub output_dir: PathBuf,
}

/// Options for the sensitivity sweep grid
#[derive(Args)]
pub struct GridOpts {
    /// Highest solar module cost in the sweep ($/W)
    #[arg(long, default_value_t = 0.22)]
    pub module_cost_max: f64,
    /// Lowest solar module cost in the sweep ($/W)
    #[arg(long, default_value_t = 0.02)]
    pub module_cost_min: f64,
    /// Step between solar module costs ($/W)
    #[arg(long, default_value_t = 0.01)]
    pub module_cost_step: f64,
    /// Highest battery unit cost in the sweep ($/kWh)
    #[arg(long, default_value_t = 200.0)]
    pub bess_cost_max: f64,
    /// Lowest battery unit cost in the sweep ($/kWh)
    #[arg(long, default_value_t = 100.0)]
    pub bess_cost_min: f64,
    /// Step between battery unit costs ($/kWh)
    #[arg(long, default_value_t = 10.0)]
    pub bess_cost_step: f64,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Evaluate every design in a model and write per-design metrics.
    Evaluate {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Output options
        #[command(flatten)]
        output: OutputOpts,
    },
    /// Compute the Pareto frontier over (LCOE, renewable fraction).
    Pareto {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Candidate selection options
        #[command(flatten)]
        select: SelectOpts,
        /// Whether to also price each candidate with the other gas technology
        #[arg(long)]
        both_gas: bool,
        /// Output options
        #[command(flatten)]
        output: OutputOpts,
    },
    /// Sweep solar module and battery unit costs, reporting the winning
    /// design per grid point.
    Sensitivity {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Candidate selection options
        #[command(flatten)]
        select: SelectOpts,
        /// Grid options
        #[command(flatten)]
        grid: GridOpts,
        /// Output options
        #[command(flatten)]
        output: OutputOpts,
    },
    /// Validate a model.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Evaluate { model_dir, output } => {
                handle_evaluate_command(&model_dir, &output.output_dir)
            }
            Self::Pareto {
                model_dir,
                select,
                both_gas,
                output,
            } => handle_pareto_command(&model_dir, &select, both_gas, &output.output_dir),
            Self::Sensitivity {
                model_dir,
                select,
                grid,
                output,
            } => handle_sensitivity_command(&model_dir, &select, &grid, &output.output_dir),
            Self::Validate { model_dir } => handle_validate_command(&model_dir),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    log::init(cli.log_level.as_deref()).context("Failed to initialise logging.")?;

    cli.command.execute()
}

/// Handle the `evaluate` command.
pub fn handle_evaluate_command(model_dir: &Path, output_dir: &Path) -> Result<()> {
    let (designs, assumptions) = load_model(model_dir).context("Failed to load model.")?;

    let results = evaluate_designs(&designs, &assumptions);
    ensure!(!results.is_empty(), "No design could be evaluated");

    if let Some((design, metrics)) = results
        .iter()
        .min_by(|a, b| a.1.lcoe.value().total_cmp(&b.1.lcoe.value()))
    {
        info!(
            "Lowest LCOE: {:.2} $/MWh ({:.0} MW solar, {:.0} MW BESS, {:.0} MW gas, \
             {:.1}% renewable)",
            metrics.lcoe.value(),
            design.spec.solar_capacity_mw,
            design.spec.bess_max_power_mw,
            design.spec.natural_gas_capacity_mw,
            100.0 * metrics.renewable_fraction.value()
        );
    }

    create_output_directory(output_dir)?;
    write_metrics(output_dir, &results)?;
    info!(
        "Wrote metrics for {} of {} designs to {}",
        results.len(),
        designs.len(),
        output_dir.display()
    );

    Ok(())
}

/// Handle the `pareto` command.
pub fn handle_pareto_command(
    model_dir: &Path,
    select: &SelectOpts,
    both_gas: bool,
    output_dir: &Path,
) -> Result<()> {
    let (designs, assumptions) = load_model(model_dir).context("Failed to load model.")?;

    let candidates = candidates_with_lcoe(
        &designs,
        &assumptions,
        &select.location,
        select.gas_capacity_mw,
        both_gas,
    );
    ensure!(
        !candidates.is_empty(),
        "No evaluable candidates at {} with {} MW of gas",
        select.location,
        select.gas_capacity_mw
    );

    if let Some((design, lcoe)) = lowest_lcoe_candidate(&candidates) {
        info!(
            "Lowest LCOE at {}: {:.2} $/MWh ({:.0} MW solar, {:.0} MW BESS, {})",
            select.location,
            lcoe.value(),
            design.spec.solar_capacity_mw,
            design.spec.bess_max_power_mw,
            design.spec.gas_technology
        );
    }

    let frontier = pareto_frontier(candidates)?;
    let rows = frontier
        .into_iter()
        .map(|(design, lcoe)| {
            let renewable = lifetime_renewable_percentage(&design)?;
            Ok((design, lcoe, renewable.value()))
        })
        .collect::<Result<Vec<_>>>()?;

    create_output_directory(output_dir)?;
    write_frontier(output_dir, &rows)?;
    info!(
        "Wrote a {}-point Pareto frontier to {}",
        rows.len(),
        output_dir.display()
    );

    Ok(())
}

/// Handle the `sensitivity` command.
pub fn handle_sensitivity_command(
    model_dir: &Path,
    select: &SelectOpts,
    grid: &GridOpts,
    output_dir: &Path,
) -> Result<()> {
    let (designs, assumptions) = load_model(model_dir).context("Failed to load model.")?;

    let module_costs = descending_grid(
        grid.module_cost_max,
        grid.module_cost_min,
        grid.module_cost_step,
    )?;
    let bess_unit_costs =
        descending_grid(grid.bess_cost_max, grid.bess_cost_min, grid.bess_cost_step)?;
    info!(
        "Sweeping {} module costs x {} battery costs",
        module_costs.len(),
        bess_unit_costs.len()
    );

    let points = capital_cost_sensitivity(
        &designs,
        &assumptions,
        &select.location,
        select.gas_capacity_mw,
        &module_costs,
        &bess_unit_costs,
    );
    ensure!(!points.is_empty(), "No grid point could be evaluated");

    create_output_directory(output_dir)?;
    write_sensitivity(output_dir, &points)?;
    info!(
        "Wrote {} of {} grid points to {}",
        points.len(),
        module_costs.len() * bess_unit_costs.len(),
        output_dir.display()
    );

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_dir: &Path) -> Result<()> {
    // Load/validate the model
    load_model(model_dir).context("Failed to validate model.")?;
    info!("Model validation successful!");

    Ok(())
}

/// Grid values from `max` down to `min` inclusive, `step` apart.
fn descending_grid(max: f64, min: f64, step: f64) -> Result<Vec<f64>> {
    ensure!(step > 0.0, "Grid step must be positive");
    ensure!(max >= min, "Grid maximum must not be below its minimum");

    let mut values = Vec::new();
    let mut value = max;
    // Tolerance so that e.g. 0.22 - 20 * 0.01 still hits 0.02
    while value >= min - step * 1e-6 {
        values.push(value);
        value -= step;
    }
    Ok(values)
}
