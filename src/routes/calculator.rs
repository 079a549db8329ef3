//! Calculator and catalogue routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::calculator::*;
use crate::state::AppState;

pub fn calculator_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calculate-loan", post(calculate_loan_quote))
        .route("/api/calculate-fee", post(calculate_fee))
        .route("/api/fees/ranges", get(list_fee_ranges))
        .route("/api/pricing/:country", get(get_pricing))
        .route("/api/lenders", get(list_lenders))
        .route("/api/steps", get(list_steps))
}
