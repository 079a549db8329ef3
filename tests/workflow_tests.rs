//! Fulfillment pipeline tests
//!
//! Exercise the step rules on in-memory applications; no database required.

mod common;

use chrono::Duration;

use common::{fixed_now, sample_application};
use loanflow_server::application::workflow::{
    advance, assign_lender, record_lender_response, set_account_number, step_descriptors,
    update_review_status,
};
use loanflow_server::application::{
    ApplicationStatus, LenderResponse, LoanApplication, Step, WorkflowError,
};

fn at_step(step: i32) -> LoanApplication {
    let mut app = sample_application();
    let now = fixed_now();
    for target in 2..=step {
        match target {
            5 => assign_lender(&mut app, "BANK002", "BNP Paribas", now).unwrap(),
            6 => record_lender_response(&mut app, LenderResponse::Approved, None, now).unwrap(),
            7 => set_account_number(&mut app, "FR7630006000011234567890189", now).unwrap(),
            _ => {}
        }
        advance(&mut app, target, now).unwrap();
    }
    app
}

// ============================================================================
// Full walk
// ============================================================================

#[test]
fn test_walk_all_seven_steps() {
    let mut app = sample_application();
    let start = fixed_now();

    for (offset, target) in (2..=4).enumerate() {
        let now = start + Duration::hours(offset as i64 + 1);
        let step = advance(&mut app, target, now).unwrap();
        assert_eq!(step.number(), target);
        assert_eq!(app.current_step, target);
        assert_eq!(app.status, format!("step{}", target));
        assert_eq!(app.step_completed_at(target), Some(now));
    }

    let now = start + Duration::days(1);
    assign_lender(&mut app, "BANK002", "BNP Paribas", now).unwrap();
    advance(&mut app, 5, now).unwrap();

    record_lender_response(
        &mut app,
        LenderResponse::Approved,
        Some("Dossier accepté".to_string()),
        now,
    )
    .unwrap();
    assert_eq!(app.lender_message.as_deref(), Some("Dossier accepté"));
    advance(&mut app, 6, now).unwrap();

    set_account_number(&mut app, "FR7630006000011234567890189", now).unwrap();
    let done = start + Duration::days(2);
    let step = advance(&mut app, 7, done).unwrap();

    assert_eq!(step, Step::FundsTransfer);
    assert_eq!(app.current_step, 7);
    assert_eq!(app.status, "completed");
    assert_eq!(app.status(), ApplicationStatus::Completed);
    assert_eq!(app.step7_completed_at, Some(done));
    assert_eq!(app.updated_at, done);

    // Every step carries a timestamp once the pipeline is done
    for step in 1..=7 {
        assert!(app.step_completed_at(step).is_some(), "step {} missing", step);
    }
}

#[test]
fn test_completed_application_cannot_advance() {
    let mut app = at_step(7);
    let err = advance(&mut app, 7, fixed_now()).unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_step_out_of_range() {
    let mut app = sample_application();
    assert_eq!(
        advance(&mut app, 0, fixed_now()),
        Err(WorkflowError::StepOutOfRange(0))
    );
    assert_eq!(
        advance(&mut app, 8, fixed_now()),
        Err(WorkflowError::StepOutOfRange(8))
    );
    assert_eq!(app.current_step, 1);
}

#[test]
fn test_rewind_repeat_and_skip_are_rejected() {
    let mut app = at_step(3);
    let before = app.clone();

    for target in [1, 2, 3, 5] {
        let err = advance(&mut app, target, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::OutOfOrder {
                current: 3,
                target
            }
        );
    }

    assert_eq!(app.current_step, before.current_step);
    assert_eq!(app.status, before.status);
    assert_eq!(app.step4_completed_at, None);
}

#[test]
fn test_rejected_application_cannot_advance() {
    let mut app = at_step(5);
    record_lender_response(&mut app, LenderResponse::Rejected, None, fixed_now()).unwrap();

    assert_eq!(app.status, "rejected");
    let err = advance(&mut app, 6, fixed_now()).unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
}

// ============================================================================
// Step preconditions
// ============================================================================

#[test]
fn test_step5_requires_lender() {
    let mut app = at_step(4);
    assert_eq!(
        advance(&mut app, 5, fixed_now()),
        Err(WorkflowError::MissingLender)
    );
}

#[test]
fn test_step6_requires_approval() {
    let mut app = at_step(5);
    assert_eq!(
        advance(&mut app, 6, fixed_now()),
        Err(WorkflowError::LenderNotApproved)
    );
}

#[test]
fn test_step7_requires_account_number() {
    let mut app = at_step(6);
    assert_eq!(
        advance(&mut app, 7, fixed_now()),
        Err(WorkflowError::MissingAccountNumber)
    );
}

// ============================================================================
// Side operations
// ============================================================================

#[test]
fn test_assign_lender_before_step4_is_rejected() {
    let mut app = at_step(3);
    let err = assign_lender(&mut app, "BANK001", "Crédit Mutuel", fixed_now()).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::StepNotReached {
            required: 4,
            current: 3,
            ..
        }
    ));
    assert!(app.lender_id.is_none());
}

#[test]
fn test_assign_lender_checks_catalogue() {
    let mut app = at_step(4);

    assert_eq!(
        assign_lender(&mut app, "BANK999", "Banque Inconnue", fixed_now()),
        Err(WorkflowError::UnknownLender("BANK999".to_string()))
    );
    assert!(matches!(
        assign_lender(&mut app, "BANK004", "BNP Paribas", fixed_now()),
        Err(WorkflowError::LenderNameMismatch { expected: "LCL", .. })
    ));
}

#[test]
fn test_assign_lender_is_idempotent() {
    let mut app = at_step(4);
    let now = fixed_now();

    assign_lender(&mut app, "BANK004", "LCL", now).unwrap();
    let first = app.clone();
    assign_lender(&mut app, "BANK004", "LCL", now).unwrap();

    assert_eq!(app.lender_id, first.lender_id);
    assert_eq!(app.lender_name, first.lender_name);
    assert_eq!(app.current_step, first.current_step);
    assert_eq!(app.status, first.status);
}

#[test]
fn test_lender_cannot_change_after_response() {
    let mut app = at_step(5);
    record_lender_response(&mut app, LenderResponse::Approved, None, fixed_now()).unwrap();

    assert_eq!(
        assign_lender(&mut app, "BANK001", "Crédit Mutuel", fixed_now()),
        Err(WorkflowError::LenderAlreadyResponded)
    );
    // Re-confirming the same lender is still allowed
    assert!(assign_lender(&mut app, "BANK002", "BNP Paribas", fixed_now()).is_ok());
}

#[test]
fn test_lender_response_requires_step5() {
    let mut app = at_step(4);
    assign_lender(&mut app, "BANK002", "BNP Paribas", fixed_now()).unwrap();

    let err = record_lender_response(&mut app, LenderResponse::Approved, None, fixed_now())
        .unwrap_err();
    assert!(matches!(err, WorkflowError::StepNotReached { required: 5, .. }));
}

#[test]
fn test_repeated_rejection_is_idempotent() {
    let mut app = at_step(5);
    record_lender_response(&mut app, LenderResponse::Rejected, None, fixed_now()).unwrap();
    record_lender_response(&mut app, LenderResponse::Rejected, None, fixed_now()).unwrap();

    assert_eq!(app.lender_response(), Some(LenderResponse::Rejected));
    assert_eq!(app.status(), ApplicationStatus::Rejected);

    // Reversing the decision is not
    let err = record_lender_response(&mut app, LenderResponse::Approved, None, fixed_now())
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
}

#[test]
fn test_blank_lender_message_is_dropped() {
    let mut app = at_step(5);
    record_lender_response(
        &mut app,
        LenderResponse::Approved,
        Some("   ".to_string()),
        fixed_now(),
    )
    .unwrap();
    assert_eq!(app.lender_message, None);
}

#[test]
fn test_account_number_requires_step6() {
    let mut app = at_step(5);
    record_lender_response(&mut app, LenderResponse::Approved, None, fixed_now()).unwrap();

    let err = set_account_number(&mut app, "FR76", fixed_now()).unwrap_err();
    assert!(matches!(err, WorkflowError::StepNotReached { required: 6, .. }));
}

#[test]
fn test_account_number_is_trimmed_and_overwritable() {
    let mut app = at_step(6);
    set_account_number(&mut app, "  FR76 0001  ", fixed_now()).unwrap();
    assert_eq!(app.account_number.as_deref(), Some("FR76 0001"));

    set_account_number(&mut app, "FR76 0002", fixed_now()).unwrap();
    assert_eq!(app.account_number.as_deref(), Some("FR76 0002"));
}

// ============================================================================
// Review status
// ============================================================================

#[test]
fn test_review_status_overwrites_status_only() {
    let mut app = at_step(3);
    update_review_status(&mut app, ApplicationStatus::Approved, fixed_now()).unwrap();

    assert_eq!(app.status, "approved");
    assert_eq!(app.current_step, 3);
}

#[test]
fn test_review_rejection_is_terminal() {
    let mut app = at_step(3);
    update_review_status(&mut app, ApplicationStatus::Rejected, fixed_now()).unwrap();

    let err = advance(&mut app, 4, fixed_now()).unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
}

#[test]
fn test_lender_rejection_cannot_be_reopened() {
    let mut app = at_step(5);
    record_lender_response(&mut app, LenderResponse::Rejected, None, fixed_now()).unwrap();

    let err = update_review_status(&mut app, ApplicationStatus::Pending, fixed_now()).unwrap_err();
    assert_eq!(err, WorkflowError::Terminal("rejected".to_string()));
    assert_eq!(app.status, "rejected");

    let err = record_lender_response(&mut app, LenderResponse::Approved, None, fixed_now())
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
    assert_eq!(app.lender_response(), Some(LenderResponse::Rejected));

    let err = advance(&mut app, 6, fixed_now()).unwrap_err();
    assert!(matches!(err, WorkflowError::Terminal(_)));
    assert_eq!(app.current_step, 5);
}

#[test]
fn test_review_rejection_cannot_be_reopened() {
    let mut app = at_step(3);
    update_review_status(&mut app, ApplicationStatus::Rejected, fixed_now()).unwrap();

    for status in [ApplicationStatus::Pending, ApplicationStatus::Approved] {
        let err = update_review_status(&mut app, status, fixed_now()).unwrap_err();
        assert_eq!(err, WorkflowError::Terminal("rejected".to_string()));
    }
    assert_eq!(app.status, "rejected");
}

#[test]
fn test_repeated_review_rejection_is_idempotent() {
    let mut app = at_step(3);
    update_review_status(&mut app, ApplicationStatus::Rejected, fixed_now()).unwrap();
    update_review_status(&mut app, ApplicationStatus::Rejected, fixed_now()).unwrap();
    assert_eq!(app.status, "rejected");
}

#[test]
fn test_completed_status_is_protected() {
    let mut app = at_step(7);
    let err = update_review_status(&mut app, ApplicationStatus::Pending, fixed_now()).unwrap_err();
    assert_eq!(err, WorkflowError::Terminal("completed".to_string()));
    assert_eq!(app.status, "completed");
}

#[test]
fn test_step_descriptors() {
    let steps = step_descriptors();
    assert_eq!(steps.len(), 7);
    assert_eq!(steps[0].id, 1);
    assert_eq!(steps[6].key, Step::FundsTransfer);
    assert!(steps.iter().all(|s| !s.title.is_empty()));
}
