//! Debt, tax depreciation and the other financing-side cash flows.
//!
//! Debt is a fixed-leverage level annuity. No amortization table is carried:
//! the interest-only portion of each payment comes straight from the
//! closed-form remaining-balance expression, which is all the tax calculation
//! needs.
use crate::assumptions::CostAssumptions;
use crate::costs::{federal_itc, total_capex};
use crate::npv::{CashFlow, present_value};
use crate::plant::PlantSpec;
use crate::units::{Dimensionless, Money};

/// Fraction of the ITC that reduces the depreciable basis (the half-basis
/// convention for ITC-eligible assets)
const ITC_BASIS_REDUCTION: f64 = 0.5;

/// The constant annual payment amortizing `principal` over `term` years.
///
/// Standard level-annuity formula; at a zero rate the limit is a straight
/// split of the principal.
fn annuity_payment(principal: Money, rate: f64, term: u32) -> Money {
    if rate == 0.0 {
        return principal / Dimensionless(term as f64);
    }
    let factor = (1.0 + rate).powi(term as i32);
    principal * Dimensionless(rate * factor / (factor - 1.0))
}

/// Interest-only portion of the payment due in `year` (1-based).
///
/// Derived from the annuity identity: the remaining balance after `year - 1`
/// payments is `P * ((1+i)^n - (1+i)^(y-1)) / ((1+i)^n - 1)`, and interest is
/// that balance times the rate.
fn interest_payment(principal: Money, rate: f64, term: u32, year: u32) -> Money {
    if rate == 0.0 {
        return Money(0.0);
    }
    let factor = (1.0 + rate).powi(term as i32);
    let remaining = (factor - (1.0 + rate).powi(year as i32 - 1)) / (factor - 1.0);
    principal * Dimensionless(rate * remaining)
}

/// Debt principal: the leveraged share of total capex.
fn debt_principal(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    total_capex(spec, assumptions) * Dimensionless(assumptions.leverage)
}

/// NPV of the debt service payments (negative).
///
/// An identical payment falls due in each of years 1 through `debt_term`,
/// discounted at the cost of equity like every other flow.
pub fn debt_service_npv(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let payment = annuity_payment(
        debt_principal(spec, assumptions),
        assumptions.cost_of_debt,
        assumptions.debt_term,
    );
    let flows: Vec<_> = (1..=assumptions.debt_term)
        .map(|year| CashFlow::new(year as i32, -payment))
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// NPV of the interest expense alone (negative).
///
/// Principal repayments are not tax-deductible, so the tax calculation needs
/// the interest portion on its own.
pub fn interest_expense_npv(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let principal = debt_principal(spec, assumptions);
    let flows: Vec<_> = (1..=assumptions.debt_term)
        .map(|year| {
            let interest = interest_payment(
                principal,
                assumptions.cost_of_debt,
                assumptions.debt_term,
                year,
            );
            CashFlow::new(year as i32, -interest)
        })
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

/// NPV of accelerated depreciation (negative).
///
/// The depreciable basis is total capex less half the investment tax credit,
/// written off over operating years 1-6 per the schedule in the assumptions.
pub fn depreciation_npv(spec: &PlantSpec, assumptions: &CostAssumptions) -> Money {
    let depreciable_amount = -(total_capex(spec, assumptions)
        - federal_itc(spec, assumptions) * Dimensionless(ITC_BASIS_REDUCTION));
    let flows: Vec<_> = assumptions
        .depreciation_schedule
        .iter()
        .enumerate()
        .map(|(index, percentage)| {
            CashFlow::new(
                index as i32 + 1,
                depreciable_amount * Dimensionless(*percentage),
            )
        })
        .collect();
    present_value(
        &flows,
        Dimensionless(assumptions.cost_of_equity),
        assumptions.construction_years,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assumptions, spec};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1000.0, 0.05, 10, 129.5045749654567)] // 1000 * CRF(10yr, 5%)
    #[case(500.0, 0.03, 5, 109.17728570028798)]
    #[case(2000.0, 0.0, 20, 100.0)] // zero-rate limit is principal / term
    fn test_annuity_payment(
        #[case] principal: f64,
        #[case] rate: f64,
        #[case] term: u32,
        #[case] expected: f64,
    ) {
        let result = annuity_payment(Money(principal), rate, term);
        assert_approx_eq!(Money, result, Money(expected), epsilon = 1e-8);
    }

    #[test]
    fn test_interest_payment_year_one_is_rate_on_principal() {
        let result = interest_payment(Money(1000.0), 0.075, 20, 1);
        assert_approx_eq!(Money, result, Money(75.0), epsilon = 1e-9);
    }

    /// The closed-form interest expression must agree with an explicit
    /// year-by-year amortization table.
    #[test]
    fn test_interest_matches_amortization_table() {
        let principal = 1_000_000.0;
        let rate = 0.075;
        let term = 20;

        let payment = annuity_payment(Money(principal), rate, term).value();
        let mut balance = principal;
        for year in 1..=term {
            let table_interest = balance * rate;
            balance -= payment - table_interest;

            let closed_form = interest_payment(Money(principal), rate, term, year);
            assert_approx_eq!(
                Money,
                closed_form,
                Money(table_interest),
                epsilon = 1e-4
            );
        }

        // Fully amortized at the end of the term
        assert_approx_eq!(f64, balance, 0.0, epsilon = 1e-4);
    }

    #[rstest]
    fn test_debt_service_npv(spec: crate::plant::PlantSpec, assumptions: CostAssumptions) {
        let principal = total_capex(&spec, &assumptions).value() * 0.70;
        let payment = annuity_payment(Money(principal), 0.075, 20).value();

        let expected: f64 = (1..=20)
            .map(|year| -payment / 1.11_f64.powi(year + 2))
            .sum();

        let result = debt_service_npv(&spec, &assumptions);
        assert_approx_eq!(Money, result, Money(expected), epsilon = 1e-3);
    }

    #[rstest]
    fn test_interest_npv_smaller_than_debt_service(
        spec: crate::plant::PlantSpec,
        assumptions: CostAssumptions,
    ) {
        // Both are negative; interest excludes principal so it is smaller in
        // magnitude.
        let debt_service = debt_service_npv(&spec, &assumptions);
        let interest = interest_expense_npv(&spec, &assumptions);
        assert!(debt_service < Money(0.0));
        assert!(interest < Money(0.0));
        assert!(interest > debt_service);
    }

    #[rstest]
    fn test_depreciation_npv(spec: crate::plant::PlantSpec, assumptions: CostAssumptions) {
        let basis =
            -(total_capex(&spec, &assumptions).value() - 0.5 * federal_itc(&spec, &assumptions).value());
        let schedule = [0.20, 0.32, 0.192, 0.115, 0.115, 0.058];

        let expected: f64 = schedule
            .iter()
            .enumerate()
            .map(|(index, pct)| basis * pct / 1.11_f64.powi(index as i32 + 3))
            .sum();

        let result = depreciation_npv(&spec, &assumptions);
        assert_approx_eq!(Money, result, Money(expected), epsilon = 1e-3);
    }

    #[rstest]
    fn test_zero_rate_debt_splits_principal(
        spec: crate::plant::PlantSpec,
        mut assumptions: CostAssumptions,
    ) {
        assumptions.cost_of_debt = 0.0;

        // Interest-free debt is a pure principal schedule: no interest at all
        assert_eq!(interest_expense_npv(&spec, &assumptions), Money(0.0));

        let principal = debt_principal(&spec, &assumptions).value();
        let per_year = principal / 20.0;
        let expected: f64 = (1..=20).map(|year| -per_year / 1.11_f64.powi(year + 2)).sum();
        assert_approx_eq!(
            Money,
            debt_service_npv(&spec, &assumptions),
            Money(expected),
            epsilon = 1e-3
        );
    }
}
