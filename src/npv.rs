//! The discounted-cash-flow primitive that every valuation in this crate is
//! built on.
use crate::units::{Dimensionless, Money};

/// A single dated cash flow.
///
/// `year` is an offset from the start of operation: year 1 is the first
/// operating year, year 0 and negative years fall within construction.
/// Amounts are signed; outflows are negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    /// Year offset from the start of operation
    pub year: i32,
    /// Signed amount (negative = outflow)
    pub amount: Money,
}

impl CashFlow {
    /// Create a new [`CashFlow`]
    pub fn new(year: i32, amount: Money) -> Self {
        Self { year, amount }
    }
}

/// Present value of a cash-flow series at the given discount rate.
///
/// Each amount is discounted by `(1 + rate)^-(year + construction_years)`.
/// The extra shift by `construction_years` anchors the valuation date at the
/// start of construction rather than the start of operation: capex flows sit
/// at year offsets `0, -1, ...` and the first operating year is discounted
/// over `construction_years + 1` periods.
///
/// The order of entries is irrelevant. `rate` must be greater than -1, which
/// is enforced when cost assumptions are validated.
pub fn present_value(
    series: &[CashFlow],
    rate: Dimensionless,
    construction_years: u32,
) -> Money {
    series
        .iter()
        .map(|flow| {
            flow.amount * (Dimensionless(1.0) + rate).powi(-(flow.year + construction_years as i32))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1, 100.0, 0.11, 2, 100.0 / (1.11_f64.powi(3)))] // first operating year
    #[case(0, 50.0, 0.11, 2, 50.0 / (1.11_f64.powi(2)))] // final construction year
    #[case(-1, 50.0, 0.11, 2, 50.0 / 1.11)] // first construction year
    #[case(5, -75.0, 0.0, 3, -75.0)] // zero rate leaves amounts unchanged
    #[case(2, 100.0, -0.5, 0, 400.0)] // negative rates > -1 are allowed
    fn test_present_value_single_flow(
        #[case] year: i32,
        #[case] amount: f64,
        #[case] rate: f64,
        #[case] construction_years: u32,
        #[case] expected: f64,
    ) {
        let series = [CashFlow::new(year, Money(amount))];
        let result = present_value(&series, Dimensionless(rate), construction_years);
        assert_approx_eq!(Money, result, Money(expected), epsilon = 1e-10);
    }

    #[test]
    fn test_present_value_empty_series() {
        assert_eq!(present_value(&[], Dimensionless(0.08), 2), Money(0.0));
    }

    #[test]
    fn test_present_value_order_irrelevant() {
        let series = [
            CashFlow::new(3, Money(10.0)),
            CashFlow::new(1, Money(-5.0)),
            CashFlow::new(-1, Money(2.0)),
        ];
        let mut reversed = series;
        reversed.reverse();

        let rate = Dimensionless(0.07);
        assert_approx_eq!(
            Money,
            present_value(&series, rate, 2),
            present_value(&reversed, rate, 2)
        );
    }
}
