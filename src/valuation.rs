//! The equity-value engine and the closed-form breakeven-LCOE solver.
//!
//! [`after_tax_equity_npv`] is the central valuation: the NPV accruing to
//! equity holders of building and operating a design at an assumed energy
//! price. It is affine in the LCOE (revenue is its only price-dependent
//! term), which is what lets [`breakeven_lcoe`] solve for the zero directly
//! instead of root-finding.
use crate::assumptions::CostAssumptions;
use crate::costs::{
    federal_itc_npv, fixed_om_npv, fuel_cost_npv, operating_costs, total_capex, variable_om_npv,
};
use crate::error::{EvalError, EvalResult};
use crate::financing::{debt_service_npv, depreciation_npv, interest_expense_npv};
use crate::npv::{CashFlow, present_value};
use crate::plant::PlantDesign;
use crate::units::{Dimensionless, Energy, Money, MoneyPerEnergy};

/// NPV of EBITDA over the project lifetime at the given energy price.
///
/// Each operating year contributes `lcoe * load served` of revenue plus the
/// (negative) operating costs for that year.
pub fn ebitda_npv(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
    lcoe: MoneyPerEnergy,
) -> Money {
    let flows: Vec<_> = design
        .production
        .iter()
        .map(|production| {
            let revenue = lcoe * Energy(production.load_served_mwh);
            let ebitda = revenue + operating_costs(&design.spec, assumptions, production);
            CashFlow::new(production.year as i32, ebitda)
        })
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// NPV of income tax effects: tax due on EBITDA net of depreciation and
/// interest deductions, plus the investment tax credit.
pub fn tax_benefit_npv(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
    lcoe: MoneyPerEnergy,
) -> Money {
    let taxable = ebitda_npv(design, assumptions, lcoe)
        + depreciation_npv(&design.spec, assumptions)
        + interest_expense_npv(&design.spec, assumptions);
    Dimensionless(-assumptions.combined_tax_rate) * taxable
        + federal_itc_npv(&design.spec, assumptions)
}

/// NPV of the equity-funded share of capex (negative).
///
/// The equity share is spread evenly across the construction years, at year
/// offsets `0, -1, ..., -(construction_years - 1)`.
pub fn equity_capex_npv(design: &PlantDesign, assumptions: &CostAssumptions) -> Money {
    let equity_capex = total_capex(&design.spec, assumptions)
        * Dimensionless(1.0 - assumptions.leverage);
    let per_year = equity_capex / Dimensionless(assumptions.construction_years as f64);

    let flows: Vec<_> = (0..assumptions.construction_years)
        .map(|offset| CashFlow::new(-(offset as i32), -per_year))
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// After-tax NPV to equity investors of operating the design at the given
/// energy price.
pub fn after_tax_equity_npv(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
    lcoe: MoneyPerEnergy,
) -> Money {
    ebitda_npv(design, assumptions, lcoe)
        + debt_service_npv(&design.spec, assumptions)
        + tax_benefit_npv(design, assumptions, lcoe)
        + equity_capex_npv(design, assumptions)
}

/// The increase in after-tax equity NPV from a $1/MWh increase in the LCOE:
/// the discounted, after-tax value of one extra dollar on every MWh served.
pub fn incremental_equity_npv_per_lcoe(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
) -> Money {
    let flows: Vec<_> = design
        .production
        .iter()
        .map(|production| {
            CashFlow::new(production.year as i32, Money(production.load_served_mwh))
        })
        .collect();
    let production_npv = present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    );
    production_npv * Dimensionless(1.0 - assumptions.combined_tax_rate)
}

/// The energy price at which the project exactly earns its cost of equity.
///
/// Since [`after_tax_equity_npv`] is affine in the LCOE, the breakeven price
/// is the direct quotient `-npv(lcoe=0) / incremental`, with no iteration.
/// Fails with [`EvalError::ZeroIncrementalNpv`] when the denominator is zero
/// (e.g. a design that serves no load).
pub fn breakeven_lcoe(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
) -> EvalResult<MoneyPerEnergy> {
    let incremental = incremental_equity_npv_per_lcoe(design, assumptions);
    if incremental == Money(0.0) {
        return Err(EvalError::ZeroIncrementalNpv);
    }

    let npv_at_zero = after_tax_equity_npv(design, assumptions, MoneyPerEnergy(0.0));
    Ok(MoneyPerEnergy(-npv_at_zero.value() / incremental.value()))
}

/// The breakeven LCOE split into its cost components, each in $/MWh.
///
/// Component shares are NPV-weighted: each (sign-flipped) component NPV over
/// the total discounted cost, scaled by the LCOE. The six components sum back
/// to the LCOE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LcoeComponents {
    /// The breakeven price itself
    pub lcoe: MoneyPerEnergy,
    /// Equity-funded capex share
    pub equity_capex: MoneyPerEnergy,
    /// Debt service share
    pub debt_service: MoneyPerEnergy,
    /// Net tax share (negative when credits and deductions dominate)
    pub tax_benefit: MoneyPerEnergy,
    /// Fixed O&M share
    pub fixed_om: MoneyPerEnergy,
    /// Variable O&M share
    pub variable_om: MoneyPerEnergy,
    /// Fuel share
    pub fuel_cost: MoneyPerEnergy,
}

/// Decompose a design's breakeven LCOE into per-MWh cost components.
pub fn lcoe_components(
    design: &PlantDesign,
    assumptions: &CostAssumptions,
) -> EvalResult<LcoeComponents> {
    let lcoe = breakeven_lcoe(design, assumptions)?;

    let component_npvs = [
        equity_capex_npv(design, assumptions),
        debt_service_npv(&design.spec, assumptions),
        tax_benefit_npv(design, assumptions, lcoe),
        fixed_om_npv(design, assumptions),
        variable_om_npv(design, assumptions),
        fuel_cost_npv(design, assumptions),
    ];
    let total_cost_npv: Money = -component_npvs.into_iter().sum::<Money>();
    let per_mwh = |component: Money| (-component / total_cost_npv) * lcoe;

    let [equity_capex, debt_service, tax_benefit, fixed_om, variable_om, fuel_cost] =
        component_npvs.map(per_mwh);
    Ok(LcoeComponents {
        lcoe,
        equity_capex,
        debt_service,
        tax_benefit,
        fixed_om,
        variable_om,
        fuel_cost,
    })
}
