pub mod calculator;
pub mod payable;
pub mod run;

pub use calculator::{PayBreakdown, compute_breakdown};
pub use payable::{PayableSummary, prorate, summarize_month};
pub use run::{PayRun, PayRunError, PayrollSource, compute_pay_run};

use thiserror::Error;

/// Failures local to the wage → breakdown derivation.
#[derive(Debug, Error, PartialEq)]
pub enum PayrollError {
    #[error("monthly wage must be a non-negative amount, got {0}")]
    InvalidInput(f64),
}
