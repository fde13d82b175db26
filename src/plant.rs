//! Plant specifications and the per-year production records they are paired
//! with.
//!
//! These are inputs to the financial model: an external production simulation
//! produces one [`YearlyProduction`] record per operating year, and the core
//! treats both structs as read-only values.
use crate::id::LocationID;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashSet;

/// Which kind of gas-fired unit backs up the plant.
///
/// A design uses exactly one of the two; capex and O&M line items for the
/// other technology contribute nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum)]
pub enum GasTechnology {
    /// Reciprocating gas generators
    #[string = "generator"]
    Generator,
    /// Gas turbines
    #[string = "gas_turbine"]
    GasTurbine,
}

/// The sizing of a candidate plant. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSpec {
    /// Where the plant would be built
    pub location: LocationID,
    /// Load the plant must serve (MW)
    pub load_mw: f64,
    /// Solar nameplate capacity (MW)
    pub solar_capacity_mw: f64,
    /// Battery maximum power (MW)
    pub bess_max_power_mw: f64,
    /// Battery energy capacity (MWh)
    pub bess_energy_capacity_mwh: f64,
    /// Gas-fired capacity (MW)
    pub natural_gas_capacity_mw: f64,
    /// Which gas technology the design uses
    pub gas_technology: GasTechnology,
}

/// Simulated production for a single operating year.
///
/// All energy fields are MWh except `generator_fuel_mmbtu`, which is fuel
/// heat energy in MMBtu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProduction {
    /// Operating year, starting at 1
    pub year: u32,
    /// Raw solar output
    pub solar_output_mwh: f64,
    /// Solar output net of clipping and losses
    pub solar_net_mwh: f64,
    /// Energy cycled through the battery
    pub battery_throughput_mwh: f64,
    /// Battery output net of charging losses
    pub battery_net_output_mwh: f64,
    /// Gas-unit output
    pub generator_output_mwh: f64,
    /// Gas-unit fuel consumption (MMBtu)
    pub generator_fuel_mmbtu: f64,
    /// Load actually served
    pub load_served_mwh: f64,
}

/// A candidate design: a spec plus its simulated production series.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantDesign {
    /// The plant sizing
    pub spec: PlantSpec,
    /// One record per operating year
    pub production: Vec<YearlyProduction>,
}

impl PlantDesign {
    /// Create a design, checking the production year sequence.
    ///
    /// Years must be unique and at least 1. Order does not matter; the
    /// discounting primitive treats the series as an unordered collection.
    pub fn new(spec: PlantSpec, production: Vec<YearlyProduction>) -> Result<Self> {
        ensure!(
            !production.is_empty(),
            "design for {} has no production records",
            spec.location
        );

        let mut seen = HashSet::new();
        for record in &production {
            ensure!(
                record.year >= 1,
                "operating years start at 1; got year {}",
                record.year
            );
            ensure!(
                seen.insert(record.year),
                "duplicate production record for year {}",
                record.year
            );
        }

        Ok(Self { spec, production })
    }

    /// A copy of this design with the gas technology swapped.
    ///
    /// Used to price the same physical system with turbines instead of
    /// reciprocating generators (or vice versa).
    pub fn with_gas_technology(&self, gas_technology: GasTechnology) -> Self {
        let mut design = self.clone();
        design.spec.gas_technology = gas_technology;
        design
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{production_year, spec};
    use rstest::rstest;

    #[test]
    fn test_gas_technology_labels() {
        // The string-enum derive provides Display; the CSV output relies on
        // these exact labels
        assert_eq!(GasTechnology::Generator.to_string(), "generator");
        assert_eq!(GasTechnology::GasTurbine.to_string(), "gas_turbine");
    }

    #[rstest]
    fn test_new_rejects_empty_production(spec: PlantSpec) {
        assert!(PlantDesign::new(spec, vec![]).is_err());
    }

    #[rstest]
    fn test_new_rejects_year_zero(spec: PlantSpec) {
        let result = PlantDesign::new(spec, vec![production_year(0)]);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_new_rejects_duplicate_years(spec: PlantSpec) {
        let result = PlantDesign::new(spec, vec![production_year(1), production_year(1)]);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_new_accepts_unsorted_years(spec: PlantSpec) {
        let result = PlantDesign::new(spec, vec![production_year(3), production_year(1)]);
        assert!(result.is_ok());
    }

    #[rstest]
    fn test_with_gas_technology_only_changes_the_enum(spec: PlantSpec) {
        let design = PlantDesign::new(spec, vec![production_year(1)]).unwrap();
        let swapped = design.with_gas_technology(GasTechnology::GasTurbine);

        assert_eq!(swapped.spec.gas_technology, GasTechnology::GasTurbine);
        assert_eq!(swapped.production, design.production);
        assert_eq!(swapped.spec.solar_capacity_mw, design.spec.solar_capacity_mw);
    }
}
