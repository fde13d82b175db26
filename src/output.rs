//! The module responsible for writing output data to disk.
use crate::plant::PlantDesign;
use crate::ranking::{DesignMetrics, SensitivityPoint};
use crate::units::MoneyPerEnergy;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for per-design metrics
const METRICS_FILE_NAME: &str = "lcoe_metrics.csv";

/// The output file name for the Pareto frontier
const FRONTIER_FILE_NAME: &str = "pareto_frontier.csv";

/// The output file name for sensitivity sweeps
const SENSITIVITY_FILE_NAME: &str = "sensitivity.csv";

/// Create the output directory if it does not already exist.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))
}

/// Used to represent one evaluated design in the metrics CSV file.
#[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
struct MetricsRow {
    location: String,
    solar_capacity_mw: f64,
    bess_max_power_mw: f64,
    natural_gas_capacity_mw: f64,
    gas_technology: String,
    lcoe: f64,
    renewable_fraction: f64,
    equity_capex_per_mwh: f64,
    debt_service_per_mwh: f64,
    tax_benefit_per_mwh: f64,
    fixed_om_per_mwh: f64,
    variable_om_per_mwh: f64,
    fuel_cost_per_mwh: f64,
}

impl MetricsRow {
    /// Create a new [`MetricsRow`]
    fn new(design: &PlantDesign, metrics: &DesignMetrics) -> Self {
        Self {
            location: design.spec.location.to_string(),
            solar_capacity_mw: design.spec.solar_capacity_mw,
            bess_max_power_mw: design.spec.bess_max_power_mw,
            natural_gas_capacity_mw: design.spec.natural_gas_capacity_mw,
            gas_technology: design.spec.gas_technology.to_string(),
            lcoe: metrics.lcoe.value(),
            renewable_fraction: metrics.renewable_fraction.value(),
            equity_capex_per_mwh: metrics.components.equity_capex.value(),
            debt_service_per_mwh: metrics.components.debt_service.value(),
            tax_benefit_per_mwh: metrics.components.tax_benefit.value(),
            fixed_om_per_mwh: metrics.components.fixed_om.value(),
            variable_om_per_mwh: metrics.components.variable_om.value(),
            fuel_cost_per_mwh: metrics.components.fuel_cost.value(),
        }
    }
}

/// Represents a row in the Pareto frontier CSV file
#[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
struct FrontierRow {
    location: String,
    solar_capacity_mw: f64,
    bess_max_power_mw: f64,
    natural_gas_capacity_mw: f64,
    gas_technology: String,
    lcoe: f64,
    renewable_fraction: f64,
}

/// Represents a row in the sensitivity sweep CSV file
#[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
struct SensitivityRow {
    module_cost: f64,
    bess_unit_cost: f64,
    lcoe: f64,
    renewable_fraction: f64,
    solar_capacity_mw: f64,
    bess_max_power_mw: f64,
}

/// Write the metrics CSV file for a batch of evaluated designs.
pub fn write_metrics(
    output_dir: &Path,
    results: &[(&PlantDesign, DesignMetrics)],
) -> Result<()> {
    let file_path = output_dir.join(METRICS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;
    for (design, metrics) in results {
        writer.serialize(MetricsRow::new(design, metrics))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the Pareto frontier CSV file. Each entry pairs a design with its
/// breakeven LCOE and renewable fraction.
pub fn write_frontier(
    output_dir: &Path,
    frontier: &[(PlantDesign, MoneyPerEnergy, f64)],
) -> Result<()> {
    let file_path = output_dir.join(FRONTIER_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;
    for (design, lcoe, renewable_fraction) in frontier {
        writer.serialize(FrontierRow {
            location: design.spec.location.to_string(),
            solar_capacity_mw: design.spec.solar_capacity_mw,
            bess_max_power_mw: design.spec.bess_max_power_mw,
            natural_gas_capacity_mw: design.spec.natural_gas_capacity_mw,
            gas_technology: design.spec.gas_technology.to_string(),
            lcoe: lcoe.value(),
            renewable_fraction: *renewable_fraction,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the sensitivity sweep CSV file.
pub fn write_sensitivity(output_dir: &Path, points: &[SensitivityPoint]) -> Result<()> {
    let file_path = output_dir.join(SENSITIVITY_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Failed to create {}", file_path.display()))?;
    for point in points {
        writer.serialize(SensitivityRow {
            module_cost: point.module_cost,
            bess_unit_cost: point.bess_unit_cost,
            lcoe: point.lcoe.value(),
            renewable_fraction: point.renewable_fraction.value(),
            solar_capacity_mw: point.solar_capacity_mw,
            bess_max_power_mw: point.bess_max_power_mw,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assumptions, hybrid_design};
    use crate::ranking::evaluate_design;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_metrics_round_trips(assumptions: crate::assumptions::CostAssumptions) {
        let dir = tempdir().unwrap();
        let design = hybrid_design();
        let metrics = evaluate_design(&design, &assumptions).unwrap();

        write_metrics(dir.path(), &[(&design, metrics)]).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(METRICS_FILE_NAME)).unwrap();
        let rows: Vec<MetricsRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "El Paso, TX");
        assert_eq!(rows[0].gas_technology, "generator");
        assert_eq!(rows[0].lcoe, metrics.lcoe.value());
    }

    #[test]
    fn test_create_output_directory_is_idempotent() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");
        create_output_directory(&output_dir).unwrap();
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());
    }
}
