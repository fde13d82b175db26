//! Fixtures for tests
use crate::assumptions::CostAssumptions;
use crate::plant::{GasTechnology, PlantDesign, PlantSpec, YearlyProduction};
use rstest::fixture;

/// Project lifetime used by the design fixtures
const LIFETIME_YEARS: u32 = 25;

#[fixture]
pub fn assumptions() -> CostAssumptions {
    CostAssumptions::standard()
}

/// A hybrid plant sized like a realistic data-centre microgrid candidate.
#[fixture]
pub fn spec() -> PlantSpec {
    PlantSpec {
        location: "El Paso, TX".into(),
        load_mw: 100.0,
        solar_capacity_mw: 100.0,
        bess_max_power_mw: 50.0,
        bess_energy_capacity_mwh: 200.0,
        natural_gas_capacity_mw: 50.0,
        gas_technology: GasTechnology::Generator,
    }
}

/// A production record for one operating year, with mild solar degradation so
/// years are not identical.
pub fn production_year(year: u32) -> YearlyProduction {
    let degradation = 1.0 - 0.005 * (year.saturating_sub(1)) as f64;
    YearlyProduction {
        year,
        solar_output_mwh: 250_000.0 * degradation,
        solar_net_mwh: 240_000.0 * degradation,
        battery_throughput_mwh: 60_000.0,
        battery_net_output_mwh: 55_000.0,
        generator_output_mwh: 150_000.0,
        generator_fuel_mmbtu: 1_200_000.0,
        load_served_mwh: 800_000.0,
    }
}

/// A solar + battery + generator design over the full project lifetime.
pub fn hybrid_design() -> PlantDesign {
    let production = (1..=LIFETIME_YEARS).map(production_year).collect();
    PlantDesign::new(spec(), production).unwrap()
}

/// A design with no battery or gas capacity: solar output alone serves the
/// load, and there is no fuel burn.
pub fn solar_only_design() -> PlantDesign {
    let spec = PlantSpec {
        location: "El Paso, TX".into(),
        load_mw: 100.0,
        solar_capacity_mw: 250.0,
        bess_max_power_mw: 0.0,
        bess_energy_capacity_mwh: 0.0,
        natural_gas_capacity_mw: 0.0,
        gas_technology: GasTechnology::Generator,
    };
    let production = (1..=LIFETIME_YEARS)
        .map(|year| YearlyProduction {
            year,
            solar_output_mwh: 600_000.0,
            solar_net_mwh: 580_000.0,
            battery_throughput_mwh: 0.0,
            battery_net_output_mwh: 0.0,
            generator_output_mwh: 0.0,
            generator_fuel_mmbtu: 0.0,
            load_served_mwh: 580_000.0,
        })
        .collect();
    PlantDesign::new(spec, production).unwrap()
}

/// Several candidate sizings at one location with the same gas capacity, for
/// batch-evaluation and frontier tests. More solar and battery means less
/// generator output and a higher renewable fraction.
pub fn design_grid() -> Vec<PlantDesign> {
    [(0.0, 0.0, 400_000.0), (100.0, 50.0, 150_000.0), (200.0, 100.0, 60_000.0)]
        .into_iter()
        .map(|(solar_mw, bess_mw, generator_output_mwh)| {
            let spec = PlantSpec {
                location: "El Paso, TX".into(),
                load_mw: 100.0,
                solar_capacity_mw: solar_mw,
                bess_max_power_mw: bess_mw,
                bess_energy_capacity_mwh: 4.0 * bess_mw,
                natural_gas_capacity_mw: 50.0,
                gas_technology: GasTechnology::Generator,
            };
            let production = (1..=LIFETIME_YEARS)
                .map(|year| {
                    let mut production = production_year(year);
                    production.generator_output_mwh = generator_output_mwh;
                    production.generator_fuel_mmbtu = 8.0 * generator_output_mwh;
                    production
                })
                .collect();
            PlantDesign::new(spec, production).unwrap()
        })
        .collect()
}
