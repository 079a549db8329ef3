//! Back-office handlers

use axum::extract::{Query, State};
use axum::Json;

use super::AdminUser;
use crate::application::{ListApplicationsQuery, LoanApplication};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/admin/loan-applications - Every application, optionally filtered by status
pub async fn list_all_applications(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<LoanApplication>>, ApiError> {
    let applications = state.application_service.list_all(query).await?;
    Ok(Json(applications))
}
