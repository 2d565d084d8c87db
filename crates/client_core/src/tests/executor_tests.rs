use super::*;
use crate::error::{Operation, ValidationError};

fn rejection(message: &str) -> TransactionError {
    TransactionError::ServerRejection {
        status: 400,
        message: message.to_string(),
    }
}

#[test]
fn begin_refuses_while_submitting() {
    let mut executor = Executor::<u32>::new();
    let ticket = executor.begin().expect("first begin");
    assert!(executor.is_submitting());
    assert!(executor.begin().is_none());
    assert!(executor.begin().is_none());

    executor.settle(ticket, Ok(7)).expect("settle");
    assert_eq!(executor.state(), &SubmissionState::Succeeded(7));
    assert!(!executor.is_submitting());
}

#[test]
fn begin_clears_previous_outcome_whatever_it_was() {
    let mut executor = Executor::<u32>::new();

    let ticket = executor.begin().expect("begin");
    executor.settle(ticket, Ok(1)).expect("settle");
    let ticket = executor.begin().expect("begin after success");
    assert!(executor.succeeded().is_none());
    executor
        .settle(ticket, Err(rejection("Insufficient funds")))
        .expect("settle");
    assert!(executor.error().is_some());

    let ticket = executor.begin().expect("begin after failure");
    assert!(executor.error().is_none());
    assert_eq!(
        executor.state(),
        &SubmissionState::Submitting {
            generation: ticket.generation()
        }
    );
}

#[test]
fn failure_settles_back_to_a_submittable_state() {
    let mut executor = Executor::<u32>::new();
    let ticket = executor.begin().expect("begin");
    executor
        .settle(
            ticket,
            Err(TransactionError::TransportFailure {
                message: "Failed to connect".to_string(),
                reason: "connection refused".to_string(),
            }),
        )
        .expect("settle");
    assert!(!executor.is_submitting());
    assert!(executor.begin().is_some());
}

#[test]
fn settle_without_outstanding_submission_is_refused() {
    let mut executor = Executor::<u32>::new();
    let ticket = executor.begin().expect("begin");
    let generation = ticket.generation();
    executor.settle(ticket, Ok(1)).expect("settle");

    let forged = SubmissionTicket { generation };
    assert_eq!(
        executor.settle(forged, Ok(2)),
        Err(SettleError::NotSubmitting)
    );
    assert_eq!(executor.succeeded(), Some(&1));
}

#[test]
fn stale_ticket_cannot_overwrite_a_newer_attempt() {
    let mut executor = Executor::<u32>::new();
    let first = executor.begin().expect("begin");
    let stale = SubmissionTicket {
        generation: first.generation(),
    };
    executor.settle(first, Ok(1)).expect("settle");
    let second = executor.begin().expect("second begin");

    assert_eq!(
        executor.settle(stale, Ok(99)),
        Err(SettleError::StaleTicket {
            stale: 1,
            current: 2
        })
    );
    assert!(executor.is_submitting());
    executor.settle(second, Ok(2)).expect("settle second");
    assert_eq!(executor.succeeded(), Some(&2));
}

#[test]
fn reject_records_validation_failure_without_submitting() {
    let mut executor = Executor::<u32>::new();
    let error: TransactionError = ValidationError::NonPositiveAmount {
        operation: Operation::Deposit,
    }
    .into();

    assert!(executor.reject(error.clone()));
    assert_eq!(executor.error(), Some(&error));
    assert!(!executor.is_submitting());

    let _ticket = executor.begin().expect("begin");
    assert!(!executor.reject(error));
    assert!(executor.is_submitting());
}

#[test]
fn dismiss_leaves_outstanding_submission_alone() {
    let mut executor = Executor::<u32>::new();
    executor.reject(rejection("nope"));
    executor.dismiss();
    assert_eq!(executor.state(), &SubmissionState::Idle);

    let _ticket = executor.begin().expect("begin");
    executor.dismiss();
    assert!(executor.is_submitting());
}
