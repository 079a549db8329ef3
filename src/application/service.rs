//! Application store - persistence and pipeline mutations for loan applications

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use super::model::{
    ApplicationStatus, CreateLoanApplicationRequest, LenderResponse, ListApplicationsQuery,
    LoanApplication, ReviewStatus,
};
use super::workflow::{self, Step, WorkflowError};
use crate::calculator::{
    calculate_loan, calculate_processing_fee, CalculationError, FeeRequest, LoanQuote,
};

/// Application store errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Loan application {0} not found")]
    NotFound(i32),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ApplicationError {
    fn from(e: sqlx::Error) -> Self {
        ApplicationError::DatabaseError(e.to_string())
    }
}

/// Amounts the server derives from a submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionPricing {
    pub quote: LoanQuote,
    pub processing_fee: i64,
}

/// Recompute repayment and fee figures for a submission
pub fn price_submission(
    request: &CreateLoanApplicationRequest,
    annual_rate: f64,
) -> Result<SubmissionPricing, CalculationError> {
    let quote = calculate_loan(f64::from(request.amount), request.duration, annual_rate)?;
    let fee = calculate_processing_fee(&FeeRequest {
        client_type: request.client_type,
        country: request.country,
        monthly_income: request.monthly_income.clone(),
        loan_amount: i64::from(request.amount),
    });

    Ok(SubmissionPricing {
        quote,
        processing_fee: fee.processing_fee,
    })
}

/// Clients send amounts as numbers or numeric strings
fn log_ignored_amount(field: &'static str, candidate: Option<&serde_json::Value>, computed: i64) {
    let Some(candidate) = candidate else {
        return;
    };

    let client_value = match candidate {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    if client_value.map(|v| v.round() as i64) != Some(computed) {
        tracing::debug!(
            field,
            client_value = %candidate,
            server_value = computed,
            "Ignoring client-supplied amount"
        );
    }
}

/// Loan application service
#[derive(Clone)]
pub struct LoanApplicationService {
    db_pool: PgPool,
    annual_rate: f64,
}

impl LoanApplicationService {
    pub fn new(db_pool: PgPool, annual_rate: f64) -> Self {
        Self {
            db_pool,
            annual_rate,
        }
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    /// Insert a validated submission owned by `user_id`
    pub async fn create(
        &self,
        request: CreateLoanApplicationRequest,
        user_id: Uuid,
    ) -> Result<LoanApplication, ApplicationError> {
        let pricing = price_submission(&request, self.annual_rate)?;

        if let Some(candidate) = request.processing_fee {
            if candidate != pricing.processing_fee {
                tracing::debug!(
                    client_fee = candidate,
                    server_fee = pricing.processing_fee,
                    "Ignoring client-supplied processing fee"
                );
            }
        }
        log_ignored_amount(
            "monthlyPayment",
            request.monthly_payment.as_ref(),
            pricing.quote.monthly_payment,
        );
        log_ignored_amount("totalCost", request.total_cost.as_ref(), pricing.quote.total_cost);

        let now = Utc::now();
        let initial = Step::Simulation;

        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            INSERT INTO loan_applications (
                user_id, amount, duration, purpose, monthly_payment, total_cost,
                first_name, last_name, email, phone, date_of_birth,
                employment_status, monthly_income, monthly_expenses,
                client_type, country, processing_fee,
                current_step, step1_completed_at, status,
                terms_accepted, credit_check_accepted, marketing_accepted,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.amount)
        .bind(request.duration)
        .bind(request.purpose.trim())
        .bind(pricing.quote.monthly_payment.to_string())
        .bind(pricing.quote.total_cost.to_string())
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(request.phone.trim())
        .bind(&request.date_of_birth)
        .bind(&request.employment_status)
        .bind(&request.monthly_income)
        .bind(request.monthly_expenses)
        .bind(request.client_type.as_str())
        .bind(request.country.as_str())
        .bind(pricing.processing_fee as i32)
        .bind(initial.number())
        .bind(now)
        .bind(initial.status().as_string())
        .bind(request.terms_accepted)
        .bind(request.credit_check_accepted)
        .bind(request.marketing_accepted.unwrap_or(false))
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            application_id = application.id,
            user_id = %user_id,
            amount = application.amount,
            processing_fee = application.processing_fee,
            "Loan application created"
        );

        Ok(application)
    }

    pub async fn get(&self, id: i32) -> Result<LoanApplication, ApplicationError> {
        sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ApplicationError::NotFound(id))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<LoanApplication>, ApplicationError> {
        let applications = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(applications)
    }

    /// List every application, optionally filtered by status
    pub async fn list_all(
        &self,
        query: ListApplicationsQuery,
    ) -> Result<Vec<LoanApplication>, ApplicationError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * limit;

        let mut query_builder: sqlx::QueryBuilder<Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM loan_applications WHERE 1=1");

        if let Some(status) = query.status {
            query_builder.push(" AND status = ");
            query_builder.push_bind(status);
        }

        query_builder.push(" ORDER BY created_at DESC LIMIT ");
        query_builder.push_bind(limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let applications = query_builder
            .build_query_as::<LoanApplication>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(applications)
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: ReviewStatus,
    ) -> Result<LoanApplication, ApplicationError> {
        self.mutate(id, |app, now| {
            workflow::update_review_status(app, status.into(), now)
        })
        .await
    }

    pub async fn advance_step(
        &self,
        id: i32,
        step: i32,
    ) -> Result<LoanApplication, ApplicationError> {
        Step::from_number(step)?;
        let application = self
            .mutate(id, |app, now| workflow::advance(app, step, now).map(|_| ()))
            .await?;

        tracing::info!(
            application_id = id,
            step,
            status = %application.status,
            "Application advanced"
        );

        Ok(application)
    }

    pub async fn assign_lender(
        &self,
        id: i32,
        lender_id: &str,
        lender_name: &str,
    ) -> Result<LoanApplication, ApplicationError> {
        self.mutate(id, |app, now| {
            workflow::assign_lender(app, lender_id, lender_name, now)
        })
        .await
    }

    pub async fn record_lender_response(
        &self,
        id: i32,
        response: LenderResponse,
        message: Option<String>,
    ) -> Result<LoanApplication, ApplicationError> {
        let application = self
            .mutate(id, |app, now| {
                workflow::record_lender_response(app, response, message, now)
            })
            .await?;

        if application.status() == ApplicationStatus::Rejected {
            tracing::info!(application_id = id, "Application rejected by lender");
        }

        Ok(application)
    }

    pub async fn set_account_number(
        &self,
        id: i32,
        account_number: &str,
    ) -> Result<LoanApplication, ApplicationError> {
        self.mutate(id, |app, now| {
            workflow::set_account_number(app, account_number, now)
        })
        .await
    }

    /// Load a row under lock, apply a pipeline rule, and write the pipeline columns back
    async fn mutate<F>(&self, id: i32, apply: F) -> Result<LoanApplication, ApplicationError>
    where
        F: FnOnce(&mut LoanApplication, DateTime<Utc>) -> Result<(), WorkflowError>,
    {
        let mut tx = self.db_pool.begin().await?;

        let mut application = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApplicationError::NotFound(id))?;

        apply(&mut application, Utc::now())?;

        let updated = persist_pipeline(&mut tx, &application).await?;
        tx.commit().await?;

        Ok(updated)
    }
}

async fn persist_pipeline(
    tx: &mut Transaction<'_, Postgres>,
    app: &LoanApplication,
) -> Result<LoanApplication, sqlx::Error> {
    sqlx::query_as::<_, LoanApplication>(
        r#"
        UPDATE loan_applications
        SET current_step = $1, status = $2,
            step1_completed_at = $3, step2_completed_at = $4, step3_completed_at = $5,
            step4_completed_at = $6, step5_completed_at = $7, step6_completed_at = $8,
            step7_completed_at = $9,
            lender_id = $10, lender_name = $11, lender_response = $12,
            lender_message = $13, account_number = $14, updated_at = $15
        WHERE id = $16
        RETURNING *
        "#,
    )
    .bind(app.current_step)
    .bind(&app.status)
    .bind(app.step1_completed_at)
    .bind(app.step2_completed_at)
    .bind(app.step3_completed_at)
    .bind(app.step4_completed_at)
    .bind(app.step5_completed_at)
    .bind(app.step6_completed_at)
    .bind(app.step7_completed_at)
    .bind(&app.lender_id)
    .bind(&app.lender_name)
    .bind(&app.lender_response)
    .bind(&app.lender_message)
    .bind(&app.account_number)
    .bind(app.updated_at)
    .bind(app.id)
    .fetch_one(&mut **tx)
    .await
}
