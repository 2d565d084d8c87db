//! Per-page submission state machine.
//!
//! A page owns one [`Executor`]. [`Executor::begin`] is the only way into
//! `Submitting` and refuses while a request is outstanding, which is what
//! keeps a page at one in-flight request. Leaving `Submitting` requires the
//! [`SubmissionTicket`] handed out by `begin`, so a completion can only ever
//! settle the attempt that produced it.

use thiserror::Error;

use crate::error::TransactionError;

/// Proof of an outstanding submission. Not `Clone`: settling consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState<T> {
    Idle,
    Submitting { generation: u64 },
    Succeeded(T),
    Failed(TransactionError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettleError {
    #[error("no submission is outstanding")]
    NotSubmitting,
    #[error("submission {stale} was superseded by submission {current}")]
    StaleTicket { stale: u64, current: u64 },
}

/// What happened to a submit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// A request was already outstanding; nothing was done.
    Ignored,
    /// Input failed validation; no request was sent.
    Rejected,
    /// One request was sent and its outcome recorded.
    Settled,
}

#[derive(Debug)]
pub struct Executor<T> {
    state: SubmissionState<T>,
    generation: u64,
}

impl<T> Default for Executor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Executor<T> {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SubmissionState<T> {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting { .. })
    }

    pub fn succeeded(&self) -> Option<&T> {
        match &self.state {
            SubmissionState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransactionError> {
        match &self.state {
            SubmissionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Enters `Submitting`, dropping any previous outcome. `None` while a
    /// request is already outstanding.
    pub fn begin(&mut self) -> Option<SubmissionTicket> {
        if self.is_submitting() {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = SubmissionState::Submitting {
            generation: self.generation,
        };
        Some(SubmissionTicket {
            generation: self.generation,
        })
    }

    /// Records a failure detected before sending. Ignored while submitting.
    pub fn reject(&mut self, error: TransactionError) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.state = SubmissionState::Failed(error);
        true
    }

    pub fn settle(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<T, TransactionError>,
    ) -> Result<(), SettleError> {
        match self.state {
            SubmissionState::Submitting { generation } if generation == ticket.generation => {
                self.state = match outcome {
                    Ok(value) => SubmissionState::Succeeded(value),
                    Err(err) => SubmissionState::Failed(err),
                };
                Ok(())
            }
            SubmissionState::Submitting { generation } => Err(SettleError::StaleTicket {
                stale: ticket.generation,
                current: generation,
            }),
            _ => Err(SettleError::NotSubmitting),
        }
    }

    /// Drops a displayed outcome. Does nothing while submitting.
    pub fn dismiss(&mut self) {
        if !self.is_submitting() {
            self.state = SubmissionState::Idle;
        }
    }
}

#[cfg(test)]
#[path = "tests/executor_tests.rs"]
mod tests;
