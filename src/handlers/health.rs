//! Service banner and health check

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use crate::db;
use crate::state::AppState;

pub async fn root() -> &'static str {
    "LoanFlow API Server"
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
    pub environment: &'static str,
    pub version: &'static str,
}

/// GET /health - 503 when the database is unreachable
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status, database) = match db::check_health(&state.db_pool).await {
        Ok(()) => (StatusCode::OK, "healthy", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unhealthy",
                "unreachable".to_string(),
            )
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            environment: state.environment.as_str(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
