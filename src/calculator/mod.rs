//! Pricing and repayment calculators
//!
//! Pure functions shared by the public simulator endpoints and by the
//! application store, which recomputes every derived amount at submission.

mod fee;
mod loan;
mod pricing;

pub use fee::{
    calculate_processing_fee, fee_ranges, ClientType, Country, FeeBreakdown, FeeRange,
    FeeRequest, FeeResult, IncomeBand, MAX_PROCESSING_FEE, MIN_PROCESSING_FEE,
};
pub use loan::{
    calculate_apr, calculate_interest_cost, calculate_loan, LoanQuote, DEFAULT_ANNUAL_RATE,
};
pub use pricing::{pricing_grid, PricingEntry, PricingGrid};

use thiserror::Error;

/// Calculator input errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Invalid loan parameters: {0}")]
    InvalidParameters(String),
}
