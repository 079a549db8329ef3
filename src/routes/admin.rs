//! Back-office routes

use axum::{routing::get, Router};

use crate::handlers::admin;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/api/admin/loan-applications",
        get(admin::list_all_applications),
    )
}
