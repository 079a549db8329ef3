//! Amortizing loan repayment math

use serde::Serialize;

use super::CalculationError;

/// Annual rate used when none is configured
pub const DEFAULT_ANNUAL_RATE: f64 = 0.05;

/// Repayment schedule summary, in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub monthly_payment: i64,
    pub total_cost: i64,
    pub interest_rate: f64,
}

/// Compute the fixed monthly payment of an amortizing loan.
///
/// The payment is rounded to the nearest whole unit and the total cost is the
/// rounded payment times the number of months, so `monthly_payment * n ==
/// total_cost` always holds. A zero rate degenerates to `amount / n`.
pub fn calculate_loan(
    amount: f64,
    duration_months: i32,
    annual_rate: f64,
) -> Result<LoanQuote, CalculationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CalculationError::InvalidParameters(
            "amount must be greater than 0".to_string(),
        ));
    }
    if duration_months <= 0 {
        return Err(CalculationError::InvalidParameters(
            "duration must be at least one month".to_string(),
        ));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(CalculationError::InvalidParameters(
            "interest rate must not be negative".to_string(),
        ));
    }

    let n = f64::from(duration_months);
    let monthly_rate = annual_rate / 12.0;

    let payment = if monthly_rate == 0.0 {
        amount / n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        amount * monthly_rate * growth / (growth - 1.0)
    };

    let monthly_payment = payment.round() as i64;

    Ok(LoanQuote {
        monthly_payment,
        total_cost: monthly_payment * i64::from(duration_months),
        interest_rate: annual_rate,
    })
}

/// Interest paid over the life of the loan
pub fn calculate_interest_cost(amount: i64, total_cost: i64) -> i64 {
    total_cost - amount
}

/// Simplified annualized rate: interest over principal, scaled to twelve months
pub fn calculate_apr(amount: i64, monthly_payment: i64, duration_months: i32) -> f64 {
    if amount <= 0 || duration_months <= 0 {
        return 0.0;
    }
    let total_repaid = monthly_payment * i64::from(duration_months);
    let interest_paid = (total_repaid - amount) as f64;
    (interest_paid / amount as f64) * (12.0 / f64::from(duration_months))
}
