//! Common functionality for the off-grid hybrid plant evaluation engine.
#![warn(missing_docs)]
pub mod assumptions;
pub mod cli;
pub mod costs;
pub mod error;
pub mod financing;
pub mod id;
pub mod input;
pub mod log;
pub mod npv;
pub mod output;
pub mod plant;
pub mod ranking;
pub mod units;
pub mod valuation;

#[cfg(test)]
mod fixture;
