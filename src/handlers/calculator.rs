//! Public calculator and catalogue endpoints. None of these require a session.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::{workflow::step_descriptors, Lender, StepDescriptor, LENDERS};
use crate::calculator::{
    calculate_apr, calculate_interest_cost, calculate_loan, calculate_processing_fee, fee_ranges,
    pricing_grid, ClientType, Country, FeeRequest, FeeResult, PricingGrid,
};
use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CalculateLoanRequest {
    #[validate(range(min = 500.0, max = 3000.0, message = "Amount must be between 500 and 3000"))]
    pub amount: f64,
    #[validate(range(min = 3, max = 12, message = "Duration must be between 3 and 12 months"))]
    pub duration: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCalculationResponse {
    pub amount: f64,
    pub duration: i32,
    pub monthly_payment: i64,
    pub total_cost: i64,
    pub interest_rate: f64,
    pub interest_cost: i64,
    pub apr: f64,
}

/// POST /api/calculate-loan
pub async fn calculate_loan_quote(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CalculateLoanRequest>,
) -> Result<Json<LoanCalculationResponse>, ApiError> {
    let rate = state.application_service.annual_rate();
    let quote = calculate_loan(req.amount, req.duration, rate)?;
    let principal = req.amount.round() as i64;

    Ok(Json(LoanCalculationResponse {
        amount: req.amount,
        duration: req.duration,
        monthly_payment: quote.monthly_payment,
        total_cost: quote.total_cost,
        interest_rate: quote.interest_rate,
        interest_cost: calculate_interest_cost(principal, quote.total_cost),
        apr: calculate_apr(principal, quote.monthly_payment, req.duration),
    }))
}

/// POST /api/calculate-fee
pub async fn calculate_fee(
    ValidatedJson(req): ValidatedJson<FeeRequest>,
) -> Json<FeeResult> {
    Json(calculate_processing_fee(&req))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRangeEntry {
    pub client_type: ClientType,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
}

/// GET /api/fees/ranges
pub async fn list_fee_ranges() -> Json<Vec<FeeRangeEntry>> {
    let ranges = fee_ranges()
        .into_iter()
        .map(|(client_type, range)| FeeRangeEntry {
            client_type,
            label: client_type.label(),
            min: range.min,
            max: range.max,
        })
        .collect();
    Json(ranges)
}

/// Accepts short slugs as well as the display names
fn parse_market(raw: &str) -> Option<Country> {
    match raw.to_lowercase().as_str() {
        "fr" | "france" => Some(Country::France),
        "ci" | "civ" | "cote-divoire" | "cote-d-ivoire" => Some(Country::CoteDIvoire),
        _ => Country::parse(raw),
    }
}

/// GET /api/pricing/:country
pub async fn get_pricing(Path(country): Path<String>) -> Result<Json<PricingGrid>, ApiError> {
    let market = parse_market(&country)
        .ok_or_else(|| ApiError::NotFound(format!("No pricing for market '{}'", country)))?;
    Ok(Json(pricing_grid(market)))
}

/// GET /api/lenders
pub async fn list_lenders() -> Json<&'static [Lender]> {
    Json(&LENDERS[..])
}

/// GET /api/steps
pub async fn list_steps() -> Json<Vec<StepDescriptor>> {
    Json(step_descriptors())
}
