//! Session-guarded banking client.
//!
//! Pages ([`pages`]) gate entry on a stored session, validate form input,
//! send at most one request at a time through an [`executor::Executor`],
//! and reconcile the reply into view state. The HTTP side lives in [`api`].

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod pages;
pub mod reconcile;
pub mod session;
pub mod validation;

pub use api::{ApiFailure, BankApi, HttpBankClient};
pub use error::{ErrorKind, Operation, TransactionError, ValidationError};
pub use executor::{Executor, SubmissionState, SubmissionTicket, SubmitDisposition};
pub use reconcile::{format_currency, BalanceView, Notice, TransactionOutcome, TransactionReceipt};
pub use session::{
    FileSessionStore, MemorySessionStore, Navigator, RecordingNavigator, Session,
    SessionContext, SessionStore,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
