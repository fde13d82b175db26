//! Common routines for handling input data.
//!
//! A model directory holds a `production.csv` with one row per design-year
//! (the output of the external production simulation) and an optional
//! `assumptions.toml` overriding the baseline cost assumptions. Rows sharing
//! a plant spec are grouped into one [`PlantDesign`]; file order is
//! preserved.
use crate::assumptions::CostAssumptions;
use crate::plant::{GasTechnology, PlantDesign, PlantSpec, YearlyProduction};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// The file name for per-year production records
const PRODUCTION_FILE_NAME: &str = "production.csv";

/// The file name for cost-assumption overrides
const ASSUMPTIONS_FILE_NAME: &str = "assumptions.toml";

/// Read a series of type `T`s from a CSV file into a `Vec<T>`.
pub fn read_vec_from_csv<T: DeserializeOwned>(csv_file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(csv_file_path)
        .with_context(|| format!("Error reading {}", csv_file_path.display()))?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        let record: T =
            result.with_context(|| format!("Error reading {}", csv_file_path.display()))?;
        vec.push(record);
    }

    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        csv_file_path.display()
    );

    Ok(vec)
}

/// Parse a TOML file into the specified type.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path)
        .with_context(|| format!("Error reading {}", file_path.display()))?;
    toml::from_str(&toml_str).with_context(|| format!("Error parsing {}", file_path.display()))
}

/// One row of `production.csv`: a plant spec plus one year of simulated
/// production. The spec fields repeat on every row of a design.
#[derive(Debug, Deserialize)]
struct ProductionRow {
    location: String,
    load_mw: f64,
    solar_capacity_mw: f64,
    bess_max_power_mw: f64,
    bess_energy_capacity_mwh: f64,
    natural_gas_capacity_mw: f64,
    gas_technology: GasTechnology,
    year: u32,
    solar_output_mwh: f64,
    solar_net_mwh: f64,
    battery_throughput_mwh: f64,
    battery_net_output_mwh: f64,
    generator_output_mwh: f64,
    generator_fuel_mmbtu: f64,
    load_served_mwh: f64,
}

impl ProductionRow {
    fn spec(&self) -> PlantSpec {
        PlantSpec {
            location: self.location.as_str().into(),
            load_mw: self.load_mw,
            solar_capacity_mw: self.solar_capacity_mw,
            bess_max_power_mw: self.bess_max_power_mw,
            bess_energy_capacity_mwh: self.bess_energy_capacity_mwh,
            natural_gas_capacity_mw: self.natural_gas_capacity_mw,
            gas_technology: self.gas_technology,
        }
    }

    fn production(&self) -> YearlyProduction {
        YearlyProduction {
            year: self.year,
            solar_output_mwh: self.solar_output_mwh,
            solar_net_mwh: self.solar_net_mwh,
            battery_throughput_mwh: self.battery_throughput_mwh,
            battery_net_output_mwh: self.battery_net_output_mwh,
            generator_output_mwh: self.generator_output_mwh,
            generator_fuel_mmbtu: self.generator_fuel_mmbtu,
            load_served_mwh: self.load_served_mwh,
        }
    }

    /// A grouping key identifying the design this row belongs to.
    fn design_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.location,
            self.load_mw,
            self.solar_capacity_mw,
            self.bess_max_power_mw,
            self.bess_energy_capacity_mwh,
            self.natural_gas_capacity_mw,
        )
    }
}

/// Read the production CSV from a model directory and group its rows into
/// designs. Rows of one design may appear anywhere in the file.
pub fn read_designs(model_dir: &Path) -> Result<Vec<PlantDesign>> {
    let file_path = model_dir.join(PRODUCTION_FILE_NAME);
    let rows: Vec<ProductionRow> = read_vec_from_csv(&file_path)?;

    let mut grouped: IndexMap<String, (PlantSpec, Vec<YearlyProduction>)> = IndexMap::new();
    for row in rows {
        grouped
            .entry(row.design_key())
            .or_insert_with(|| (row.spec(), Vec::new()))
            .1
            .push(row.production());
    }

    grouped
        .into_values()
        .map(|(spec, production)| {
            PlantDesign::new(spec, production)
                .with_context(|| format!("Error reading {}", file_path.display()))
        })
        .collect()
}

/// Read cost assumptions from a model directory, falling back to the
/// baseline when no `assumptions.toml` is present. The returned bundle is
/// always validated.
pub fn read_assumptions(model_dir: &Path) -> Result<CostAssumptions> {
    let file_path = model_dir.join(ASSUMPTIONS_FILE_NAME);
    let assumptions = if file_path.is_file() {
        read_toml(&file_path)?
    } else {
        info!("No {ASSUMPTIONS_FILE_NAME} found; using standard assumptions");
        CostAssumptions::standard()
    };

    assumptions
        .validate()
        .with_context(|| format!("Error validating {}", file_path.display()))?;
    Ok(assumptions)
}

/// Load a complete model: all candidate designs plus the cost assumptions.
pub fn load_model(model_dir: &Path) -> Result<(Vec<PlantDesign>, CostAssumptions)> {
    let designs = read_designs(model_dir)?;
    let assumptions = read_assumptions(model_dir)?;
    info!("Loaded {} designs from {}", designs.len(), model_dir.display());
    Ok((designs, assumptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const PRODUCTION_HEADER: &str = "location,load_mw,solar_capacity_mw,bess_max_power_mw,\
        bess_energy_capacity_mwh,natural_gas_capacity_mw,gas_technology,year,solar_output_mwh,\
        solar_net_mwh,battery_throughput_mwh,battery_net_output_mwh,generator_output_mwh,\
        generator_fuel_mmbtu,load_served_mwh";

    fn write_production_csv(dir: &Path, rows: &[&str]) {
        let mut file = File::create(dir.join(PRODUCTION_FILE_NAME)).unwrap();
        writeln!(file, "{PRODUCTION_HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    #[test]
    fn test_read_designs_groups_rows_by_spec() {
        let dir = tempdir().unwrap();
        // Rows of two designs, interleaved
        write_production_csv(
            dir.path(),
            &[
                "\"El Paso, TX\",100,100,50,200,125,generator,1,250000,240000,60000,55000,150000,1200000,800000",
                "\"El Paso, TX\",100,0,0,0,125,generator,1,0,0,0,0,700000,5600000,800000",
                "\"El Paso, TX\",100,100,50,200,125,generator,2,249000,239000,60000,55000,150000,1200000,800000",
            ],
        );

        let designs = read_designs(dir.path()).unwrap();
        assert_eq!(designs.len(), 2);
        assert_eq!(designs[0].production.len(), 2);
        assert_eq!(designs[1].production.len(), 1);
        assert_eq!(designs[0].spec.solar_capacity_mw, 100.0);
        assert_eq!(designs[1].spec.solar_capacity_mw, 0.0);
    }

    #[test]
    fn test_read_designs_rejects_duplicate_years() {
        let dir = tempdir().unwrap();
        write_production_csv(
            dir.path(),
            &[
                "\"El Paso, TX\",100,100,50,200,125,generator,1,250000,240000,60000,55000,150000,1200000,800000",
                "\"El Paso, TX\",100,100,50,200,125,generator,1,250000,240000,60000,55000,150000,1200000,800000",
            ],
        );

        assert!(read_designs(dir.path()).is_err());
    }

    #[test]
    fn test_read_assumptions_defaults_without_file() {
        let dir = tempdir().unwrap();
        let assumptions = read_assumptions(dir.path()).unwrap();
        assert_eq!(assumptions, CostAssumptions::standard());
    }

    #[test]
    fn test_read_assumptions_rejects_invalid_overrides() {
        let dir = tempdir().unwrap();
        let mut file = File::create(dir.path().join(ASSUMPTIONS_FILE_NAME)).unwrap();
        writeln!(file, "leverage = 1.5").unwrap();

        assert!(read_assumptions(dir.path()).is_err());
    }

    #[test]
    fn test_read_vec_from_csv_empty_file_errors() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(PRODUCTION_FILE_NAME);
        File::create(&file_path)
            .unwrap()
            .write_all(PRODUCTION_HEADER.as_bytes())
            .unwrap();

        assert!(read_vec_from_csv::<ProductionRow>(&file_path).is_err());
    }
}
