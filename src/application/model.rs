//! Loan application models and request DTOs

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::calculator::{ClientType, Country};

/// Loan application row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: i32,
    pub user_id: Uuid,

    // Loan terms
    pub amount: i32,
    pub duration: i32, // months
    pub purpose: String,
    pub monthly_payment: String,
    pub total_cost: String,

    // Applicant
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub employment_status: String,
    pub monthly_income: String,
    pub monthly_expenses: Option<i32>,

    // Segmentation
    pub client_type: String,
    pub country: String,
    pub processing_fee: i32,

    // Pipeline
    pub current_step: i32,
    pub step1_completed_at: Option<DateTime<Utc>>,
    pub step2_completed_at: Option<DateTime<Utc>>,
    pub step3_completed_at: Option<DateTime<Utc>>,
    pub step4_completed_at: Option<DateTime<Utc>>,
    pub step5_completed_at: Option<DateTime<Utc>>,
    pub step6_completed_at: Option<DateTime<Utc>>,
    pub step7_completed_at: Option<DateTime<Utc>>,
    pub status: String,

    // Lender
    pub lender_id: Option<String>,
    pub lender_name: Option<String>,
    pub lender_response: Option<String>,
    pub lender_message: Option<String>,
    pub account_number: Option<String>,

    // Agreements
    pub terms_accepted: bool,
    pub credit_check_accepted: bool,
    pub marketing_accepted: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn status(&self) -> ApplicationStatus {
        ApplicationStatus::parse(&self.status).unwrap_or(ApplicationStatus::Pending)
    }

    pub fn lender_response(&self) -> Option<LenderResponse> {
        self.lender_response.as_deref().and_then(LenderResponse::parse)
    }

    /// Completion timestamp of a step (1-based)
    pub fn step_completed_at(&self, step: i32) -> Option<DateTime<Utc>> {
        match step {
            1 => self.step1_completed_at,
            2 => self.step2_completed_at,
            3 => self.step3_completed_at,
            4 => self.step4_completed_at,
            5 => self.step5_completed_at,
            6 => self.step6_completed_at,
            7 => self.step7_completed_at,
            _ => None,
        }
    }

    pub(crate) fn set_step_completed_at(&mut self, step: i32, at: DateTime<Utc>) {
        let slot = match step {
            1 => &mut self.step1_completed_at,
            2 => &mut self.step2_completed_at,
            3 => &mut self.step3_completed_at,
            4 => &mut self.step4_completed_at,
            5 => &mut self.step5_completed_at,
            6 => &mut self.step6_completed_at,
            7 => &mut self.step7_completed_at,
            _ => return,
        };
        *slot = Some(at);
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Application status as stored in the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    /// Waiting at pipeline step 1..=6
    Step(i32),
    Completed,
    Rejected,
    Pending,
    Approved,
}

impl ApplicationStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(ApplicationStatus::Completed),
            "rejected" => Some(ApplicationStatus::Rejected),
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            other => other
                .strip_prefix("step")
                .and_then(|n| n.parse::<i32>().ok())
                .filter(|n| (1..=7).contains(n))
                .map(ApplicationStatus::Step),
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            ApplicationStatus::Step(n) => format!("step{}", n),
            ApplicationStatus::Completed => "completed".to_string(),
            ApplicationStatus::Rejected => "rejected".to_string(),
            ApplicationStatus::Pending => "pending".to_string(),
            ApplicationStatus::Approved => "approved".to_string(),
        }
    }

    /// No further pipeline transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Completed | ApplicationStatus::Rejected
        )
    }
}

/// Lender decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LenderResponse {
    Approved,
    Rejected,
}

impl LenderResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            LenderResponse::Approved => "approved",
            LenderResponse::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(LenderResponse::Approved),
            "rejected" => Some(LenderResponse::Rejected),
            _ => None,
        }
    }
}

/// Manual review decision of the simple approve/reject workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl From<ReviewStatus> for ApplicationStatus {
    fn from(status: ReviewStatus) -> Self {
        match status {
            ReviewStatus::Pending => ApplicationStatus::Pending,
            ReviewStatus::Approved => ApplicationStatus::Approved,
            ReviewStatus::Rejected => ApplicationStatus::Rejected,
        }
    }
}

fn must_be_accepted(value: bool, message: &'static str) -> Result<(), ValidationError> {
    if value {
        return Ok(());
    }
    let mut err = ValidationError::new("must_be_accepted");
    err.message = Some(Cow::Borrowed(message));
    Err(err)
}

fn terms_accepted(value: &bool) -> Result<(), ValidationError> {
    must_be_accepted(*value, "You must accept the terms and conditions")
}

fn credit_check_accepted(value: &bool) -> Result<(), ValidationError> {
    must_be_accepted(*value, "You must accept the credit check")
}

/// Request body for submitting an application.
///
/// `processing_fee`, `monthly_payment` and `total_cost` are client previews;
/// the server recomputes all three.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanApplicationRequest {
    #[validate(range(min = 500, max = 3000, message = "Amount must be between 500 and 3000"))]
    pub amount: i32,
    #[validate(range(min = 3, max = 24, message = "Duration must be between 3 and 24 months"))]
    pub duration: i32,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,

    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Le numéro de téléphone doit contenir au moins 8 chiffres"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Date of birth is required"))]
    pub date_of_birth: String,

    #[validate(length(min = 1, message = "Employment status is required"))]
    pub employment_status: String,
    #[validate(length(min = 1, message = "Monthly income is required"))]
    pub monthly_income: String,
    #[validate(range(min = 0, message = "Monthly expenses must not be negative"))]
    pub monthly_expenses: Option<i32>,

    #[serde(default)]
    pub client_type: ClientType,
    #[serde(default)]
    pub country: Country,
    pub processing_fee: Option<i64>,
    pub monthly_payment: Option<serde_json::Value>,
    pub total_cost: Option<serde_json::Value>,

    #[validate(custom = "terms_accepted")]
    pub terms_accepted: bool,
    #[validate(custom = "credit_check_accepted")]
    pub credit_check_accepted: bool,
    pub marketing_accepted: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdvanceStepRequest {
    pub step: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignLenderRequest {
    #[validate(length(min = 1, message = "lenderId is required"))]
    pub lender_id: String,
    #[validate(length(min = 1, message = "lenderName is required"))]
    pub lender_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LenderResponseRequest {
    pub response: LenderResponse,
    #[validate(length(max = 2000, message = "message is too long"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberRequest {
    #[validate(length(min = 1, max = 64, message = "accountNumber is required"))]
    pub account_number: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    pub status: ReviewStatus,
}

/// Query for the admin listing
#[derive(Debug, Default, Deserialize)]
pub struct ListApplicationsQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
