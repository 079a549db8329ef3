//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::application::LoanApplicationService;
use crate::auth::AuthService;
use crate::config::Environment;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub application_service: Arc<LoanApplicationService>,
    pub db_pool: PgPool,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        application_service: Arc<LoanApplicationService>,
        db_pool: PgPool,
        environment: Environment,
    ) -> Self {
        Self {
            auth_service,
            application_service,
            db_pool,
            environment,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<LoanApplicationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.application_service.clone()
    }
}
