//! The capex and opex model.
//!
//! Capex is a function of the plant spec alone; operating costs additionally
//! depend on a year's production record and escalate geometrically from
//! year 1. Everything here is a pure function of its arguments, free of
//! shared state, so the functions can be unit-tested and parallelised
//! independently.
use crate::assumptions::CostAssumptions;
use crate::npv::{CashFlow, present_value};
use crate::plant::{GasTechnology, PlantDesign, PlantSpec, YearlyProduction};
use crate::units::{Dimensionless, Money};

/// Dollars per unit cost quoted in $/W, at MW scale
const PER_WATT: f64 = 1e6;

/// Dollars per unit cost quoted in $/kW or $/kWh, at MW/MWh scale
const PER_KILOWATT: f64 = 1e3;

/// Total hard (pre-soft-cost) capital expenditure for a design.
///
/// Solar unit costs are quoted in $/W, battery costs in $/kWh of energy
/// capacity and everything else in $/kW. Only the gas line items matching the
/// design's technology contribute; system integration scales with the load.
pub fn hard_capex(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let capex = &assumptions.capex;

    let solar_spend = capex.solar.total() * PER_WATT * spec.solar_capacity_mw;
    let bess_spend = capex.bess.total() * PER_KILOWATT * spec.bess_energy_capacity_mwh;
    let generators_spend = match spec.gas_technology {
        GasTechnology::Generator => {
            capex.generator.total() * PER_KILOWATT * spec.natural_gas_capacity_mw
        }
        GasTechnology::GasTurbine => 0.0,
    };
    let system_integration_spend =
        capex.system_integration.total() * PER_KILOWATT * spec.load_mw;

    Money(solar_spend + bess_spend + generators_spend + system_integration_spend)
        + gas_turbine_capex_spend(spec, assumptions)
}

/// The gas-turbine share of hard capex (zero for generator designs).
///
/// Kept separate from [`hard_capex`] because the soft-cost markup excludes it
/// (see [`total_capex`]).
pub fn gas_turbine_capex_spend(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    match spec.gas_technology {
        GasTechnology::GasTurbine => Money(
            assumptions.capex.gas_turbine.total() * PER_KILOWATT * spec.natural_gas_capacity_mw,
        ),
        GasTechnology::Generator => Money(0.0),
    }
}

/// Total capital expenditure including the soft-cost markup.
///
/// The markup applies to all hard capex *except* the gas-turbine portion,
/// which is added back at cost. This asymmetry comes from the source
/// spreadsheet and is preserved exactly; note that
/// [`federal_itc_applicable_spend`] does *not* mirror it.
pub fn total_capex(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let soft_cost_percentage = Dimensionless(assumptions.capex.soft_costs.percentage());
    let hard_capex_spend = hard_capex(spec, assumptions);

    hard_capex_spend * (Dimensionless(1.0) + soft_cost_percentage)
        - gas_turbine_capex_spend(spec, assumptions) * soft_cost_percentage
}

/// The capex base that the investment tax credit applies to.
///
/// Hard capex is re-weighted line item by line item by its ITC applicability,
/// then scaled by `total_capex / hard_capex` to pro-rate the soft-cost
/// overlay onto the eligible base. That ratio spreads soft costs uniformly
/// over *all* technologies, gas turbine included, even though [`total_capex`]
/// excludes the turbine from the markup. The inconsistency is intentional in
/// the source spreadsheet; do not "fix" it.
pub fn federal_itc_applicable_spend(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let capex = &assumptions.capex;

    let solar_spend = capex.solar.itc_weighted() * PER_WATT * spec.solar_capacity_mw;
    let bess_spend = capex.bess.itc_weighted() * PER_KILOWATT * spec.bess_energy_capacity_mwh;
    let (generators_spend, gas_turbines_spend) = match spec.gas_technology {
        GasTechnology::Generator => (
            capex.generator.itc_weighted() * PER_KILOWATT * spec.natural_gas_capacity_mw,
            0.0,
        ),
        GasTechnology::GasTurbine => (
            0.0,
            capex.gas_turbine.itc_weighted() * PER_KILOWATT * spec.natural_gas_capacity_mw,
        ),
    };
    let system_integration_spend =
        capex.system_integration.itc_weighted() * PER_KILOWATT * spec.load_mw;

    let hard_capex_applicable = Money(
        solar_spend + bess_spend + generators_spend + gas_turbines_spend + system_integration_spend,
    );

    let hard_capex_spend = hard_capex(spec, assumptions);
    if hard_capex_spend == Money(0.0) {
        // An empty design has nothing to credit
        return Money(0.0);
    }

    hard_capex_applicable * (total_capex(spec, assumptions) / hard_capex_spend)
}

/// The dollar amount of the federal investment tax credit.
pub fn federal_itc(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    federal_itc_applicable_spend(spec, assumptions)
        * Dimensionless(assumptions.investment_tax_credit)
}

/// NPV of the investment tax credit, which lands in operating year 1 rather
/// than during construction.
pub fn federal_itc_npv(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let credit = [CashFlow::new(1, federal_itc(spec, assumptions))];
    present_value(
        &credit,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// Escalation multiplier for an operating year; year 1 pays the base rate.
fn escalation(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(year as i32 - 1)
}

/// Fuel cost for one operating year (negative).
///
/// Gas-turbine designs burn a different amount of fuel than generators for
/// the same simulated output, so their fuel is corrected by the
/// turbine-vs-generator consumption ratio.
pub fn fuel_cost(
    spec: &PlantSpec,
    assumptions: &CostAssumptions,
    production: &YearlyProduction,
) -> Money {
    let mut cost = -production.generator_fuel_mmbtu
        * assumptions.fuel_price_mmbtu
        * escalation(assumptions.fuel_escalator, production.year);
    if spec.gas_technology == GasTechnology::GasTurbine {
        cost *= assumptions.turbine_vs_generator_fuel_ratio;
    }

    Money(cost)
}

/// Fixed O&M for one operating year (negative).
///
/// Covers solar, battery, the gas unit matching the design's technology,
/// balance-of-system (scaling with load) and the soft-cost O&M charge, which
/// is a fixed fraction of non-turbine hard capex. All components escalate
/// with the O&M escalator.
pub fn fixed_om_cost(
    spec: &PlantSpec,
    assumptions: &CostAssumptions,
    production: &YearlyProduction,
) -> Money {
    let opex = &assumptions.opex;
    let escalator = escalation(assumptions.om_escalator, production.year);

    let solar = opex.solar_fixed_om_kw * spec.solar_capacity_mw * PER_KILOWATT;
    let bess = opex.bess_fixed_om_kw * spec.bess_max_power_mw * PER_KILOWATT;
    let gas = match spec.gas_technology {
        GasTechnology::Generator => opex.generators_fixed_om_kw,
        GasTechnology::GasTurbine => opex.gas_turbines_fixed_om_kw,
    } * spec.natural_gas_capacity_mw
        * PER_KILOWATT;
    let bos = opex.bos_fixed_om_kw * spec.load_mw * PER_KILOWATT;
    let soft_costs = opex.soft_costs
        * (hard_capex(spec, assumptions) - gas_turbine_capex_spend(spec, assumptions)).value();

    Money(-(solar + bess + gas + bos + soft_costs) * escalator)
}

/// Variable O&M for one operating year (negative): the per-kWh charge on the
/// output of whichever gas unit the design uses.
pub fn variable_om_cost(
    spec: &PlantSpec,
    assumptions: &CostAssumptions,
    production: &YearlyProduction,
) -> Money {
    let rate = match spec.gas_technology {
        GasTechnology::Generator => assumptions.opex.generators_variable_om_kwh,
        GasTechnology::GasTurbine => assumptions.opex.gas_turbines_variable_om_kwh,
    };

    Money(
        -rate
            * production.generator_output_mwh
            * PER_KILOWATT
            * escalation(assumptions.om_escalator, production.year),
    )
}

/// All operating costs for one year (negative): fuel plus fixed and variable
/// O&M.
pub fn operating_costs(
    spec: &PlantSpec,
    assumptions: &CostAssumptions,
    production: &YearlyProduction,
) -> Money {
    fuel_cost(spec, assumptions, production)
        + fixed_om_cost(spec, assumptions, production)
        + variable_om_cost(spec, assumptions, production)
}

/// NPV of a per-year cost over the design lifetime at the cost of equity.
fn operating_cost_npv(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
    yearly_cost: impl Fn(&YearlyProduction) -> Money,
) -> Money {
    let flows: Vec<_> = design
        .production
        .iter()
        .map(|production| CashFlow::new(production.year as i32, yearly_cost(production)))
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// NPV of lifetime fuel costs.
pub fn fuel_cost_npv(design: &PlantDesign, assumptions: &CostAssumptions) -> Money {
    operating_cost_npv(design, assumptions, |production| {
        fuel_cost(&design.spec, assumptions, production)
    })
}

/// NPV of lifetime fixed O&M.
pub fn fixed_om_npv(design: &PlantDesign, assumptions: &CostAssumptions) -> Money {
    operating_cost_npv(design, assumptions, |production| {
        fixed_om_cost(&design.spec, assumptions, production)
    })
}

/// NPV of lifetime variable O&M.
pub fn variable_om_npv(design: &PlantDesign, assumptions: &CostAssumptions) -> Money {
    operating_cost_npv(design, assumptions, |production| {
        variable_om_cost(&design.spec, assumptions, production)
    })
}
