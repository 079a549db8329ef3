//! Loan application routes

use axum::{
    routing::{get, patch},
    Router,
};

use crate::handlers::applications::*;
use crate::state::AppState;

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/loan-applications",
            get(list_my_applications).post(create_application),
        )
        .route("/api/loan-applications/:id", get(get_application))
        .route("/api/loan-applications/:id/advance", patch(advance_step))
        .route(
            "/api/loan-applications/:id/assign-lender",
            patch(assign_lender),
        )
        .route(
            "/api/loan-applications/:id/lender-response",
            patch(record_lender_response),
        )
        .route(
            "/api/loan-applications/:id/account",
            patch(set_account_number),
        )
        .route("/api/loan-applications/:id/status", patch(update_status))
}
