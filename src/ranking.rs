//! Ranking candidate designs: renewable fraction, batch evaluation, design
//! lookup and the Pareto frontier over (LCOE, renewable percentage).
//!
//! Evaluating one design never depends on another, so batches and sensitivity
//! grids are dispatched across a rayon thread pool. A failure for one design
//! is logged and skipped; it never aborts the rest of the batch.
use crate::assumptions::CostAssumptions;
use crate::error::{EvalError, EvalResult};
use crate::plant::{GasTechnology, PlantDesign};
use crate::units::{Dimensionless, MoneyPerEnergy};
use crate::valuation::{LcoeComponents, breakeven_lcoe, lcoe_components};
use itertools::Itertools;
use log::warn;
use rayon::prelude::*;

/// Fraction of lifetime served load not met by the gas unit.
///
/// Errors with [`EvalError::ZeroServedLoad`] when the design serves nothing,
/// rather than dividing by zero.
pub fn lifetime_renewable_percentage(design: &PlantDesign) -> EvalResult<Dimensionless> {
    let mut total_load_served_mwh = 0.0;
    let mut total_generator_output_mwh = 0.0;
    for production in &design.production {
        total_load_served_mwh += production.load_served_mwh;
        total_generator_output_mwh += production.generator_output_mwh;
    }

    if total_load_served_mwh == 0.0 {
        return Err(EvalError::ZeroServedLoad);
    }

    Ok(Dimensionless(
        1.0 - total_generator_output_mwh / total_load_served_mwh,
    ))
}

/// The scalar results of evaluating one design.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignMetrics {
    /// Breakeven energy price
    pub lcoe: MoneyPerEnergy,
    /// Lifetime renewable fraction, in [0, 1] for sane production data
    pub renewable_fraction: Dimensionless,
    /// The LCOE split into $/MWh cost components
    pub components: LcoeComponents,
}

/// Evaluate a single design under the given assumptions.
pub fn evaluate_design(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
) -> EvalResult<DesignMetrics> {
    let components = lcoe_components(design, assumptions)?;
    let renewable_fraction = lifetime_renewable_percentage(design)?;
    Ok(DesignMetrics {
        lcoe: components.lcoe,
        renewable_fraction,
        components,
    })
}

/// Evaluate a batch of designs in parallel.
///
/// Designs that fail to evaluate are logged and dropped from the results;
/// the output preserves input order for the rest.
pub fn evaluate_designs<'a>(
    designs: &'a [PlantDesign],
    assumptions: &CostAssumptions,
) -> Vec<(&'a PlantDesign, DesignMetrics)> {
    designs
        .par_iter()
        .filter_map(|design| match evaluate_design(design, assumptions) {
            Ok(metrics) => Some((design, metrics)),
            Err(err) => {
                warn!(
                    "Skipping design at {} ({} MW solar, {} MW BESS, {} MW gas): {err}",
                    design.spec.location,
                    design.spec.solar_capacity_mw,
                    design.spec.bess_max_power_mw,
                    design.spec.natural_gas_capacity_mw
                );
                None
            }
        })
        .collect()
}

/// Look up the design matching a location and (rounded) capacity triple.
///
/// Errors with [`EvalError::SelectionMismatch`] unless exactly one design
/// matches; an arbitrary pick from an ambiguous query would silently change
/// results.
pub fn find_design<'a>(
    designs: &'a [PlantDesign],
    location: &str,
    solar_capacity_mw: f64,
    bess_max_power_mw: f64,
    natural_gas_capacity_mw: f64,
) -> EvalResult<&'a PlantDesign> {
    let mut matches = designs.iter().filter(|design| {
        let spec = &design.spec;
        spec.location.0.as_ref() == location
            && spec.solar_capacity_mw.round() == solar_capacity_mw.round()
            && spec.bess_max_power_mw.round() == bess_max_power_mw.round()
            && spec.natural_gas_capacity_mw.round() == natural_gas_capacity_mw.round()
    });

    match (matches.next(), matches.next()) {
        (Some(design), None) => Ok(design),
        (None, _) => Err(EvalError::SelectionMismatch { count: 0 }),
        (Some(_), Some(_)) => Err(EvalError::SelectionMismatch {
            count: 2 + matches.count(),
        }),
    }
}

/// Compute breakeven LCOEs for every candidate at a location with the given
/// (rounded) gas capacity.
///
/// With `both_gas` set, each candidate is additionally priced with its gas
/// technology swapped, doubling the candidate set without rerunning the
/// production simulation.
pub fn candidates_with_lcoe(
    designs: &[PlantDesign],
    assumptions: &CostAssumptions,
    location: &str,
    natural_gas_capacity_mw: f64,
    both_gas: bool,
) -> Vec<(PlantDesign, MoneyPerEnergy)> {
    let matching: Vec<_> = designs
        .iter()
        .filter(|design| {
            design.spec.location.0.as_ref() == location
                && design.spec.natural_gas_capacity_mw.round() == natural_gas_capacity_mw.round()
        })
        .collect();

    matching
        .par_iter()
        .flat_map_iter(|design| {
            let mut variants = vec![(*design).clone()];
            if both_gas {
                let other = match design.spec.gas_technology {
                    GasTechnology::Generator => GasTechnology::GasTurbine,
                    GasTechnology::GasTurbine => GasTechnology::Generator,
                };
                variants.push(design.with_gas_technology(other));
            }
            variants.into_iter()
        })
        .filter_map(|design| match breakeven_lcoe(&design, assumptions) {
            Ok(lcoe) => Some((design, lcoe)),
            Err(err) => {
                warn!("Skipping design at {}: {err}", design.spec.location);
                None
            }
        })
        .collect()
}

/// The candidate with the lowest breakeven LCOE, if any.
pub fn lowest_lcoe_candidate(
    candidates: &[(PlantDesign, MoneyPerEnergy)],
) -> Option<&(PlantDesign, MoneyPerEnergy)> {
    candidates
        .iter()
        .min_by(|a, b| a.1.value().total_cmp(&b.1.value()))
}

/// Extract the Pareto frontier trading off LCOE against renewable fraction.
///
/// Candidates are stably sorted by ascending LCOE, then scanned keeping only
/// strict improvements in renewable percentage; the cheapest candidate is
/// always kept. Ties in renewable percentage are dropped (a design no more
/// renewable and no cheaper than an earlier one is dominated), and LCOE ties
/// keep the earlier candidate thanks to sort stability.
pub fn pareto_frontier(
    mut candidates: Vec<(PlantDesign, MoneyPerEnergy)>,
) -> EvalResult<Vec<(PlantDesign, MoneyPerEnergy)>> {
    candidates.sort_by(|a, b| a.1.value().total_cmp(&b.1.value()));

    let mut frontier: Vec<(PlantDesign, MoneyPerEnergy)> = Vec::new();
    let mut best_renewable: Option<Dimensionless> = None;
    for (design, lcoe) in candidates {
        let renewable = lifetime_renewable_percentage(&design)?;
        if best_renewable.is_none_or(|best| renewable > best) {
            best_renewable = Some(renewable);
            frontier.push((design, lcoe));
        }
    }

    Ok(frontier)
}

/// One grid point of a capital-cost sensitivity sweep: the lowest-LCOE
/// candidate when solar modules and battery units are repriced.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityPoint {
    /// Solar module cost at this grid point ($/W)
    pub module_cost: f64,
    /// Battery unit cost at this grid point ($/kWh)
    pub bess_unit_cost: f64,
    /// Breakeven LCOE of the winning design
    pub lcoe: MoneyPerEnergy,
    /// Renewable fraction of the winning design
    pub renewable_fraction: Dimensionless,
    /// Solar capacity of the winning design (MW)
    pub solar_capacity_mw: f64,
    /// Battery power of the winning design (MW)
    pub bess_max_power_mw: f64,
}

/// Sweep a 2-D grid of solar module and battery unit costs, reporting the
/// lowest-LCOE design per grid point.
///
/// Grid points are independent scenario evaluations and run across the rayon
/// pool. Points whose candidate set is empty or fails to evaluate are logged
/// and omitted.
pub fn capital_cost_sensitivity(
    designs: &[PlantDesign],
    assumptions: &CostAssumptions,
    location: &str,
    natural_gas_capacity_mw: f64,
    module_costs: &[f64],
    bess_unit_costs: &[f64],
) -> Vec<SensitivityPoint> {
    let grid: Vec<_> = module_costs
        .iter()
        .cartesian_product(bess_unit_costs.iter())
        .collect();

    grid.par_iter()
        .filter_map(|&(&module_cost, &bess_unit_cost)| {
            let mut scenario = assumptions.clone();
            scenario.capex.solar.modules.cost = module_cost;
            scenario.capex.bess.bess_units.cost = bess_unit_cost;

            let candidates = candidates_with_lcoe(
                designs,
                &scenario,
                location,
                natural_gas_capacity_mw,
                false,
            );
            let Some((design, lcoe)) = lowest_lcoe_candidate(&candidates) else {
                warn!(
                    "No evaluable candidates at {location} for module cost \
                     {module_cost} and BESS cost {bess_unit_cost}"
                );
                return None;
            };

            let renewable_fraction = match lifetime_renewable_percentage(design) {
                Ok(renewable) => renewable,
                Err(err) => {
                    warn!("Skipping grid point ({module_cost}, {bess_unit_cost}): {err}");
                    return None;
                }
            };

            Some(SensitivityPoint {
                module_cost,
                bess_unit_cost,
                lcoe: *lcoe,
                renewable_fraction,
                solar_capacity_mw: design.spec.solar_capacity_mw,
                bess_max_power_mw: design.spec.bess_max_power_mw,
            })
        })
        .collect()
}
