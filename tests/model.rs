//! Integration tests exercising a full model directory end to end.
use offgrid_lcoe::input::load_model;
use offgrid_lcoe::ranking::{
    candidates_with_lcoe, evaluate_designs, lowest_lcoe_candidate, pareto_frontier,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const PRODUCTION_HEADER: &str = "location,load_mw,solar_capacity_mw,bess_max_power_mw,\
    bess_energy_capacity_mwh,natural_gas_capacity_mw,gas_technology,year,solar_output_mwh,\
    solar_net_mwh,battery_throughput_mwh,battery_net_output_mwh,generator_output_mwh,\
    generator_fuel_mmbtu,load_served_mwh";

/// Write a model directory with three candidate sizings at one location.
///
/// More solar and battery means less generator output, so the candidates span
/// a range of renewable fractions.
fn write_model(dir: &Path) {
    let mut file = File::create(dir.join("production.csv")).unwrap();
    writeln!(file, "{PRODUCTION_HEADER}").unwrap();

    let sizings = [
        (0.0, 0.0, 0.0, 400_000.0),
        (100.0, 50.0, 200.0, 150_000.0),
        (200.0, 100.0, 400.0, 60_000.0),
    ];
    for (solar_mw, bess_mw, bess_mwh, generator_mwh) in sizings {
        for year in 1..=25 {
            let solar_mwh = 2500.0 * solar_mw;
            let fuel_mmbtu = 8.0 * generator_mwh;
            writeln!(
                file,
                "\"El Paso, TX\",100,{solar_mw},{bess_mw},{bess_mwh},50,generator,{year},\
                 {solar_mwh},{solar_mwh},60000,55000,{generator_mwh},{fuel_mmbtu},800000"
            )
            .unwrap();
        }
    }
}

fn model_dir() -> TempDir {
    let dir = tempdir().unwrap();
    write_model(dir.path());
    dir
}

/// An integration test which loads and evaluates a full model
#[test]
fn test_load_and_evaluate_model() {
    let dir = model_dir();
    let (designs, assumptions) = load_model(dir.path()).unwrap();
    assert_eq!(designs.len(), 3);

    let results = evaluate_designs(&designs, &assumptions);
    assert_eq!(results.len(), 3);
    for (_, metrics) in &results {
        assert!(metrics.lcoe.value() > 0.0);
        assert!((0.0..=1.0).contains(&metrics.renewable_fraction.value()));
    }
}

/// Pricing candidates and extracting the frontier from a loaded model
#[test]
fn test_frontier_from_model() {
    let dir = model_dir();
    let (designs, assumptions) = load_model(dir.path()).unwrap();

    let candidates = candidates_with_lcoe(&designs, &assumptions, "El Paso, TX", 50.0, false);
    assert_eq!(candidates.len(), 3);

    let (_, lowest_lcoe) = lowest_lcoe_candidate(&candidates).unwrap();
    let lowest_lcoe = *lowest_lcoe;

    let frontier = pareto_frontier(candidates).unwrap();
    assert!(!frontier.is_empty());
    assert!(frontier.len() <= 3);
    // The cheapest candidate anchors the frontier
    assert_eq!(frontier[0].1, lowest_lcoe);
    // LCOE is strictly increasing along the frontier
    for pair in frontier.windows(2) {
        assert!(pair[0].1 < pair[1].1);
    }
}

/// Assumption overrides in the model directory change the evaluation
#[test]
fn test_assumption_overrides_change_lcoe() {
    let dir = model_dir();
    let (designs, assumptions) = load_model(dir.path()).unwrap();
    let baseline = evaluate_designs(&designs, &assumptions);

    // Pricier fuel can only raise the breakeven price of a gas-burning design
    let mut file = File::create(dir.path().join("assumptions.toml")).unwrap();
    writeln!(file, "fuel_price_mmbtu = 10.0").unwrap();
    drop(file);

    let (designs, assumptions) = load_model(dir.path()).unwrap();
    let repriced = evaluate_designs(&designs, &assumptions);
    assert_eq!(repriced.len(), baseline.len());
    for (baseline, repriced) in baseline.iter().zip(&repriced) {
        assert!(repriced.1.lcoe > baseline.1.lcoe);
    }
}
