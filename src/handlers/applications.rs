//! Loan application handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{AdminUser, AuthenticatedUser};
use crate::application::{
    AccountNumberRequest, AdvanceStepRequest, AssignLenderRequest, CreateLoanApplicationRequest,
    LenderResponseRequest, LoanApplication, StatusUpdateRequest,
};
use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::state::AppState;

/// POST /api/loan-applications - Submit an application for the current user
pub async fn create_application(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(req): ValidatedJson<CreateLoanApplicationRequest>,
) -> Result<(StatusCode, Json<LoanApplication>), ApiError> {
    let application = state
        .application_service
        .create(req, user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/loan-applications/:id - Owner or admin only
pub async fn get_application(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<LoanApplication>, ApiError> {
    let application = state.application_service.get(id).await?;

    if !application.is_owned_by(user.user_id) && !user.is_admin() {
        tracing::warn!(
            application_id = id,
            user_id = %user.user_id,
            "Access to another user's application denied"
        );
        return Err(ApiError::Forbidden(
            "You do not have access to this application".to_string(),
        ));
    }

    Ok(Json(application))
}

/// GET /api/loan-applications - The caller's applications, newest first
pub async fn list_my_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LoanApplication>>, ApiError> {
    let applications = state.application_service.list_by_user(user.user_id).await?;
    Ok(Json(applications))
}

/// PATCH /api/loan-applications/:id/advance
pub async fn advance_step(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<AdvanceStepRequest>,
) -> Result<Json<LoanApplication>, ApiError> {
    tracing::debug!(application_id = id, admin_id = %admin.user_id, step = req.step, "Advancing application");
    let application = state.application_service.advance_step(id, req.step).await?;
    Ok(Json(application))
}

/// PATCH /api/loan-applications/:id/assign-lender
pub async fn assign_lender(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<AssignLenderRequest>,
) -> Result<Json<LoanApplication>, ApiError> {
    let application = state
        .application_service
        .assign_lender(id, req.lender_id.trim(), req.lender_name.trim())
        .await?;
    Ok(Json(application))
}

/// PATCH /api/loan-applications/:id/lender-response
pub async fn record_lender_response(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<LenderResponseRequest>,
) -> Result<Json<LoanApplication>, ApiError> {
    let application = state
        .application_service
        .record_lender_response(id, req.response, req.message)
        .await?;
    Ok(Json(application))
}

/// PATCH /api/loan-applications/:id/account
pub async fn set_account_number(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<AccountNumberRequest>,
) -> Result<Json<LoanApplication>, ApiError> {
    let account_number = req.account_number.trim();
    if account_number.is_empty() {
        return Err(ApiError::ValidationError(vec![
            "accountNumber: accountNumber is required".to_string(),
        ]));
    }

    let application = state
        .application_service
        .set_account_number(id, account_number)
        .await?;
    Ok(Json(application))
}

/// PATCH /api/loan-applications/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<LoanApplication>, ApiError> {
    let application = state
        .application_service
        .update_status(id, req.status)
        .await?;

    tracing::info!(
        application_id = id,
        admin_id = %admin.user_id,
        status = %application.status,
        "Application status updated"
    );

    Ok(Json(application))
}
