//! Loan application domain module
//!
//! Contains the application record, the step pipeline, the lender catalogue
//! and the persistence service.

pub mod lenders;
mod model;
mod service;
pub mod workflow;

pub use lenders::{find_lender, Lender, LENDERS};
pub use model::*;
pub use service::{price_submission, ApplicationError, LoanApplicationService, SubmissionPricing};
pub use workflow::{Step, StepDescriptor, WorkflowError};
