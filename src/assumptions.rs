//! The cost-assumption bundle: financing terms, escalators, depreciation and
//! the nested capex/opex unit costs.
//!
//! A [`CostAssumptions`] value is built once per scenario (from
//! `assumptions.toml` or [`CostAssumptions::standard`]) and never mutated by
//! the core. Sensitivity sweeps clone-and-edit their own copies. Every struct
//! here deserializes with per-field defaults, so a TOML file only needs to
//! name the values it changes from the baseline.
use crate::error::{EvalError, EvalResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// A single capex line item: a unit cost plus the fraction of it that is
/// eligible for the investment tax credit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapexLine {
    /// Unit cost ($/W for solar, $/kWh for battery, $/kW otherwise)
    pub cost: f64,
    /// Fraction of the cost eligible for the ITC, in [0, 1]
    pub itc_applicability: f64,
}

impl CapexLine {
    /// An ITC-eligible line item
    fn eligible(cost: f64) -> Self {
        Self {
            cost,
            itc_applicability: 1.0,
        }
    }

    /// A line item with no ITC eligibility
    fn ineligible(cost: f64) -> Self {
        Self {
            cost,
            itc_applicability: 0.0,
        }
    }
}

macro_rules! capex_bundle {
    ($name:ident, $($field:ident),+) => {
        /// Capex line items for one technology.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(pub $field: CapexLine,)+
        }

        impl $name {
            /// Total unit cost across all line items.
            pub fn total(&self) -> f64 {
                0.0 $(+ self.$field.cost)+
            }

            /// Unit cost with each line item weighted by its ITC applicability.
            pub fn itc_weighted(&self) -> f64 {
                0.0 $(+ self.$field.cost * self.$field.itc_applicability)+
            }

            /// Line items with their names, for validation messages.
            fn lines(&self) -> Vec<(&'static str, &CapexLine)> {
                vec![$((stringify!($field), &self.$field)),+]
            }
        }
    };
}

capex_bundle!(
    SolarCapex,
    modules,
    inverters,
    racking_and_foundations,
    balance_of_system,
    labor
);
capex_bundle!(BessCapex, bess_units, balance_of_system, labor);
capex_bundle!(GeneratorCapex, gensets, balance_of_system, labor);
capex_bundle!(GasTurbineCapex, gas_turbines, balance_of_system, labor);
capex_bundle!(SystemIntegrationCapex, microgrid_switchgear, controls, labor);

impl Default for SolarCapex {
    fn default() -> Self {
        // $/W
        Self {
            modules: CapexLine::eligible(0.22),
            inverters: CapexLine::eligible(0.05),
            racking_and_foundations: CapexLine::eligible(0.18),
            balance_of_system: CapexLine::eligible(0.12),
            labor: CapexLine::eligible(0.20),
        }
    }
}

impl Default for BessCapex {
    fn default() -> Self {
        // $/kWh
        Self {
            bess_units: CapexLine::eligible(200.0),
            balance_of_system: CapexLine::eligible(40.0),
            labor: CapexLine::eligible(20.0),
        }
    }
}

impl Default for GeneratorCapex {
    fn default() -> Self {
        // $/kW
        Self {
            gensets: CapexLine::ineligible(800.0),
            balance_of_system: CapexLine::ineligible(200.0),
            labor: CapexLine::ineligible(150.0),
        }
    }
}

impl Default for GasTurbineCapex {
    fn default() -> Self {
        // $/kW
        Self {
            gas_turbines: CapexLine::ineligible(635.0),
            balance_of_system: CapexLine::ineligible(150.0),
            labor: CapexLine::ineligible(100.0),
        }
    }
}

impl Default for SystemIntegrationCapex {
    fn default() -> Self {
        // $/kW of load
        Self {
            microgrid_switchgear: CapexLine::ineligible(300.0),
            controls: CapexLine::ineligible(50.0),
            labor: CapexLine::ineligible(60.0),
        }
    }
}

/// Soft-cost categories, each a fraction of hard capex.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftCostCapex {
    pub general_conditions: f64,
    pub epc_overhead: f64,
    pub design_engineering_and_surveys: f64,
    pub permitting_and_inspection: f64,
    pub startup_and_commissioning: f64,
    pub insurance: f64,
    pub taxes: f64,
}

impl SoftCostCapex {
    /// The combined soft-cost markup fraction.
    pub fn percentage(&self) -> f64 {
        self.general_conditions
            + self.epc_overhead
            + self.design_engineering_and_surveys
            + self.permitting_and_inspection
            + self.startup_and_commissioning
            + self.insurance
            + self.taxes
    }
}

impl Default for SoftCostCapex {
    fn default() -> Self {
        Self {
            general_conditions: 0.005,
            epc_overhead: 0.05,
            design_engineering_and_surveys: 0.005,
            permitting_and_inspection: 0.0005,
            startup_and_commissioning: 0.0025,
            insurance: 0.005,
            taxes: 0.05,
        }
    }
}

/// Capex unit costs for every technology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapexAssumptions {
    /// Solar line items ($/W)
    pub solar: SolarCapex,
    /// Battery line items ($/kWh of energy capacity)
    pub bess: BessCapex,
    /// Reciprocating-generator line items ($/kW)
    pub generator: GeneratorCapex,
    /// Gas-turbine line items ($/kW)
    pub gas_turbine: GasTurbineCapex,
    /// Microgrid integration line items ($/kW of load)
    pub system_integration: SystemIntegrationCapex,
    /// Soft-cost markup fractions
    pub soft_costs: SoftCostCapex,
}

/// Operating cost unit rates. Fixed O&M rates are $/kW-year, variable rates
/// $/kWh, and `soft_costs` is an annual fraction of (non-turbine) hard capex.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpexAssumptions {
    pub solar_fixed_om_kw: f64,
    pub bess_fixed_om_kw: f64,
    pub generators_fixed_om_kw: f64,
    pub generators_variable_om_kwh: f64,
    pub gas_turbines_fixed_om_kw: f64,
    pub gas_turbines_variable_om_kwh: f64,
    pub bos_fixed_om_kw: f64,
    pub soft_costs: f64,
}

impl Default for OpexAssumptions {
    fn default() -> Self {
        Self {
            solar_fixed_om_kw: 11.0,
            bess_fixed_om_kw: 2.5,
            generators_fixed_om_kw: 10.0,
            generators_variable_om_kwh: 0.025,
            gas_turbines_fixed_om_kw: 15.0,
            gas_turbines_variable_om_kwh: 0.005,
            bos_fixed_om_kw: 6.0,
            soft_costs: 0.0025,
        }
    }
}

/// Tolerance when checking that the depreciation schedule sums to one
const DEPRECIATION_SUM_TOLERANCE: f64 = 1e-9;

/// Everything the financial model assumes about costs and financing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostAssumptions {
    /// Required return on equity (fraction per year)
    pub cost_of_equity: f64,
    /// Interest rate on debt (fraction per year)
    pub cost_of_debt: f64,
    /// Debt fraction of total capex, in [0, 1]
    pub leverage: f64,
    /// Debt amortization term (years)
    pub debt_term: u32,
    /// Combined federal and state tax rate
    pub combined_tax_rate: f64,
    /// Investment tax credit rate, in [0, 1]
    pub investment_tax_credit: f64,
    /// Construction duration (years)
    pub construction_years: u32,
    /// Annual O&M cost escalation rate
    pub om_escalator: f64,
    /// Annual fuel price escalation rate
    pub fuel_escalator: f64,
    /// Fuel price in year 1 ($/MMBtu)
    pub fuel_price_mmbtu: f64,
    /// Ratio of turbine to generator fuel consumption for the same output
    /// (turbines run a different heat rate)
    pub turbine_vs_generator_fuel_ratio: f64,
    /// Accelerated (MACRS-style) depreciation percentages for operating years
    /// 1 through 6; should sum to at most 1
    pub depreciation_schedule: [f64; 6],
    /// Capex unit costs
    pub capex: CapexAssumptions,
    /// Opex unit rates
    pub opex: OpexAssumptions,
}

impl CostAssumptions {
    /// The baseline assumption set the source model was published with.
    pub fn standard() -> Self {
        Self {
            cost_of_equity: 0.11,
            cost_of_debt: 0.075,
            leverage: 0.70,
            debt_term: 20,
            combined_tax_rate: 0.21,
            investment_tax_credit: 0.3,
            construction_years: 2,
            om_escalator: 0.025,
            fuel_escalator: 0.03,
            fuel_price_mmbtu: 5.0,
            turbine_vs_generator_fuel_ratio: 9630.0 / 8989.3,
            depreciation_schedule: [0.20, 0.32, 0.192, 0.115, 0.115, 0.058],
            capex: CapexAssumptions::default(),
            opex: OpexAssumptions::default(),
        }
    }

    /// Check that every parameter is in the range where the NPV formulas are
    /// meaningful.
    ///
    /// Called at the input boundary, before any valuation; the rest of the
    /// crate assumes a validated bundle.
    pub fn validate(&self) -> EvalResult<()> {
        let invalid = |message: String| Err(EvalError::InvalidAssumptions(message));

        if self.cost_of_equity <= -1.0 {
            return invalid(format!(
                "cost of equity must be greater than -100%; got {}",
                self.cost_of_equity
            ));
        }
        if self.cost_of_debt <= -1.0 {
            return invalid(format!(
                "cost of debt must be greater than -100%; got {}",
                self.cost_of_debt
            ));
        }
        if !(0.0..=1.0).contains(&self.leverage) {
            return invalid(format!(
                "leverage must be between 0 and 1; got {}",
                self.leverage
            ));
        }
        if self.debt_term == 0 {
            return invalid("debt term must be at least one year".to_string());
        }
        if self.construction_years == 0 {
            return invalid("construction must take at least one year".to_string());
        }
        if !(0.0..=1.0).contains(&self.investment_tax_credit) {
            return invalid(format!(
                "investment tax credit rate must be between 0 and 1; got {}",
                self.investment_tax_credit
            ));
        }
        if self.om_escalator <= -1.0 || self.fuel_escalator <= -1.0 {
            return invalid("escalation rates must be greater than -100%".to_string());
        }

        let depreciation_sum: f64 = self.depreciation_schedule.iter().sum();
        if depreciation_sum > 1.0 + DEPRECIATION_SUM_TOLERANCE {
            return invalid(format!(
                "depreciation schedule sums to {depreciation_sum}; must not exceed 1"
            ));
        }
        if depreciation_sum < 1.0 - DEPRECIATION_SUM_TOLERANCE {
            warn!(
                "Depreciation schedule sums to {depreciation_sum}; \
                 the remaining basis is never depreciated"
            );
        }

        for (bundle_name, lines) in [
            ("solar", self.capex.solar.lines()),
            ("bess", self.capex.bess.lines()),
            ("generator", self.capex.generator.lines()),
            ("gas_turbine", self.capex.gas_turbine.lines()),
            ("system_integration", self.capex.system_integration.lines()),
        ] {
            for (line_name, line) in lines {
                if !(0.0..=1.0).contains(&line.itc_applicability) {
                    return invalid(format!(
                        "ITC applicability for {bundle_name}.{line_name} must be \
                         between 0 and 1; got {}",
                        line.itc_applicability
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self::standard()
    }
}
