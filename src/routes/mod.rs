//! Route definitions for the LoanFlow API

mod admin;
mod applications;
mod auth;
mod calculator;

use axum::{routing::get, Router};

use crate::handlers::health;
use crate::state::AppState;

pub use admin::admin_routes;
pub use applications::application_routes;
pub use auth::auth_routes;
pub use calculator::calculator_routes;

/// Every route of the service with state attached; middleware is layered on by the caller
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .merge(auth_routes())
        .merge(application_routes())
        .merge(admin_routes())
        .merge(calculator_routes())
        .with_state(state)
}
