//! Seven-step fulfillment pipeline
//!
//! Transitions are applied to an in-memory [`LoanApplication`] so the rules can
//! be checked without a database; the service persists the result. Steps only
//! move forward one at a time, and each lender-side operation is gated on the
//! step that makes it meaningful.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::lenders::find_lender;
use super::model::{ApplicationStatus, LenderResponse, LoanApplication};

pub const FIRST_STEP: i32 = 1;
pub const LAST_STEP: i32 = 7;

/// Pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Simulation = 1,
    Submission = 2,
    Analysis = 3,
    LenderSubmission = 4,
    LenderResponse = 5,
    AccountOpening = 6,
    FundsTransfer = 7,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Simulation,
        Step::Submission,
        Step::Analysis,
        Step::LenderSubmission,
        Step::LenderResponse,
        Step::AccountOpening,
        Step::FundsTransfer,
    ];

    pub fn from_number(step: i32) -> Result<Self, WorkflowError> {
        Self::ALL
            .into_iter()
            .find(|s| s.number() == step)
            .ok_or(WorkflowError::StepOutOfRange(step))
    }

    pub fn number(&self) -> i32 {
        *self as i32
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Simulation => "Simulez votre prêt",
            Step::Submission => "Soumettez votre projet",
            Step::Analysis => "Analyse & validation du dossier",
            Step::LenderSubmission => "Soumission au prêteur",
            Step::LenderResponse => "Réponse du prêteur",
            Step::AccountOpening => "Ouverture de compte",
            Step::FundsTransfer => "Virement des fonds",
        }
    }

    /// Status recorded when the application reaches this step
    pub fn status(&self) -> ApplicationStatus {
        match self {
            Step::FundsTransfer => ApplicationStatus::Completed,
            step => ApplicationStatus::Step(step.number()),
        }
    }
}

/// Pipeline rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid step number {0} (expected 1-7)")]
    StepOutOfRange(i32),

    #[error("Cannot move from step {current} to step {target}: steps advance one at a time")]
    OutOfOrder { current: i32, target: i32 },

    #[error("Application is {0} and can no longer change")]
    Terminal(String),

    #[error("{operation} requires step {required} (application is at step {current})")]
    StepNotReached {
        operation: &'static str,
        required: i32,
        current: i32,
    },

    #[error("A lender must be assigned first")]
    MissingLender,

    #[error("The lender has not approved this application")]
    LenderNotApproved,

    #[error("An account number must be recorded first")]
    MissingAccountNumber,

    #[error("The lender has already responded; the lender can no longer change")]
    LenderAlreadyResponded,

    #[error("An account is already open; the lender response can no longer change")]
    AccountAlreadyOpened,

    #[error("Unknown lender: {0}")]
    UnknownLender(String),

    #[error("Lender {lender_id} is named {expected}")]
    LenderNameMismatch {
        lender_id: String,
        expected: &'static str,
    },
}

fn ensure_open(app: &LoanApplication) -> Result<(), WorkflowError> {
    let status = app.status();
    if status.is_terminal() {
        return Err(WorkflowError::Terminal(status.as_string()));
    }
    Ok(())
}

fn ensure_step(
    app: &LoanApplication,
    operation: &'static str,
    required: Step,
) -> Result<(), WorkflowError> {
    if app.current_step < required.number() {
        return Err(WorkflowError::StepNotReached {
            operation,
            required: required.number(),
            current: app.current_step,
        });
    }
    Ok(())
}

/// Move the application to `target`, which must be the step right after the current one.
pub fn advance(
    app: &mut LoanApplication,
    target: i32,
    now: DateTime<Utc>,
) -> Result<Step, WorkflowError> {
    let step = Step::from_number(target)?;
    ensure_open(app)?;

    if target != app.current_step + 1 {
        return Err(WorkflowError::OutOfOrder {
            current: app.current_step,
            target,
        });
    }

    match step {
        Step::LenderResponse if app.lender_name.is_none() => {
            return Err(WorkflowError::MissingLender)
        }
        Step::AccountOpening if app.lender_response() != Some(LenderResponse::Approved) => {
            return Err(WorkflowError::LenderNotApproved)
        }
        Step::FundsTransfer if app.account_number.is_none() => {
            return Err(WorkflowError::MissingAccountNumber)
        }
        _ => {}
    }

    app.current_step = target;
    app.set_step_completed_at(target, now);
    app.status = step.status().as_string();
    app.updated_at = now;

    Ok(step)
}

/// Assign a catalogue lender. Re-assigning the same lender is a no-op overwrite.
pub fn assign_lender(
    app: &mut LoanApplication,
    lender_id: &str,
    lender_name: &str,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let lender =
        find_lender(lender_id).ok_or_else(|| WorkflowError::UnknownLender(lender_id.to_string()))?;
    if lender.name != lender_name {
        return Err(WorkflowError::LenderNameMismatch {
            lender_id: lender_id.to_string(),
            expected: lender.name,
        });
    }

    ensure_open(app)?;
    ensure_step(app, "Lender assignment", Step::LenderSubmission)?;

    if app.lender_response.is_some() && app.lender_id.as_deref() != Some(lender_id) {
        return Err(WorkflowError::LenderAlreadyResponded);
    }

    app.lender_id = Some(lender.id.to_string());
    app.lender_name = Some(lender.name.to_string());
    app.updated_at = now;
    Ok(())
}

/// Record the lender's decision. A rejection closes the application.
pub fn record_lender_response(
    app: &mut LoanApplication,
    response: LenderResponse,
    message: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let repeat = app.lender_response() == Some(response);
    if !repeat {
        ensure_open(app)?;
    }
    ensure_step(app, "Lender response", Step::LenderResponse)?;

    if app.lender_name.is_none() {
        return Err(WorkflowError::MissingLender);
    }
    if app.account_number.is_some() && !repeat {
        return Err(WorkflowError::AccountAlreadyOpened);
    }

    app.lender_response = Some(response.as_str().to_string());
    app.lender_message = message.filter(|m| !m.trim().is_empty());
    if response == LenderResponse::Rejected {
        app.status = ApplicationStatus::Rejected.as_string();
    }
    app.updated_at = now;
    Ok(())
}

/// Record the account opened at the lender
pub fn set_account_number(
    app: &mut LoanApplication,
    account_number: &str,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    ensure_open(app)?;
    ensure_step(app, "Account opening", Step::AccountOpening)?;

    if app.lender_response() != Some(LenderResponse::Approved) {
        return Err(WorkflowError::LenderNotApproved);
    }

    app.account_number = Some(account_number.trim().to_string());
    app.updated_at = now;
    Ok(())
}

/// Overwrite the review status of the simple approve/reject workflow.
/// Completed and rejected applications keep their status; repeating it is a no-op overwrite.
pub fn update_review_status(
    app: &mut LoanApplication,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let current = app.status();
    if current.is_terminal() && current != status {
        return Err(WorkflowError::Terminal(current.as_string()));
    }

    app.status = status.as_string();
    app.updated_at = now;
    Ok(())
}

/// Step listing entry for clients rendering the tracker
#[derive(Debug, Clone, Serialize)]
pub struct StepDescriptor {
    pub id: i32,
    pub key: Step,
    pub title: &'static str,
}

pub fn step_descriptors() -> Vec<StepDescriptor> {
    Step::ALL
        .into_iter()
        .map(|step| StepDescriptor {
            id: step.number(),
            key: step,
            title: step.title(),
        })
        .collect()
}
