//! Error types for design evaluation.
//!
//! Every error here is local to the evaluation of a single design; a failure
//! for one candidate must never abort a batch evaluation of the others.
use std::error::Error;
use std::fmt;

/// A convenient alias for evaluation results
pub type EvalResult<T> = Result<T, EvalError>;

/// An error arising from the evaluation of a single plant design.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A financing or cost parameter is outside the range where the formulas
    /// are meaningful. Caught at the boundary, before any NPV computation.
    InvalidAssumptions(String),
    /// The design serves no load over its whole lifetime, so per-MWh
    /// quantities (renewable percentage, LCOE) are undefined.
    ZeroServedLoad,
    /// The discounted after-tax value of one extra dollar of LCOE is zero, so
    /// no breakeven price exists. Raised explicitly rather than letting the
    /// quotient produce an infinity or NaN.
    ZeroIncrementalNpv,
    /// A design query matched zero or several candidates when exactly one was
    /// expected.
    SelectionMismatch {
        /// How many candidates matched the query
        count: usize,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidAssumptions(message) => {
                write!(f, "invalid cost assumptions: {message}")
            }
            Self::ZeroServedLoad => {
                write!(f, "design serves no load over its lifetime")
            }
            Self::ZeroIncrementalNpv => {
                write!(
                    f,
                    "incremental equity NPV per $/MWh is zero; breakeven LCOE is undefined"
                )
            }
            Self::SelectionMismatch { count } => {
                write!(f, "design query matched {count} candidates; expected exactly one")
            }
        }
    }
}

impl Error for EvalError {}
