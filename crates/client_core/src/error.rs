//! Failure taxonomy surfaced to pages: validation, server rejection, transport.

use thiserror::Error;

/// Monetary operations a page can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Deposit,
    Transfer,
    Withdraw,
}

impl Operation {
    /// Noun used in user-facing copy ("Deposit amount must be positive.").
    pub fn noun(self) -> &'static str {
        match self {
            Operation::Deposit => "Deposit",
            Operation::Transfer => "Transfer",
            Operation::Withdraw => "Withdrawal",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Transfer => "transfer",
            Operation::Withdraw => "withdraw",
        }
    }
}

/// Input rejected before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} amount must be positive.", .operation.noun())]
    NonPositiveAmount { operation: Operation },
    /// Positive, but too large or too finely divided to send without rounding.
    #[error("{} amount is outside the supported range.", .operation.noun())]
    AmountOutOfRange { operation: Operation },
    #[error("Recipient account is required.")]
    MissingRecipient,
    #[error("Username and PIN are required.")]
    MissingCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ServerRejection,
    TransportFailure,
}

/// Every failure a page can display. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The server answered outside the success range.
    #[error("{message}")]
    ServerRejection { status: u16, message: String },
    /// The exchange did not complete; the server-side effect is unknown.
    #[error("{message}")]
    TransportFailure { message: String, reason: String },
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::Validation(_) => ErrorKind::Validation,
            TransactionError::ServerRejection { .. } => ErrorKind::ServerRejection,
            TransactionError::TransportFailure { .. } => ErrorKind::TransportFailure,
        }
    }

    /// Whether the request reached the network at all.
    pub fn was_sent(&self) -> bool {
        !matches!(self, TransactionError::Validation(_))
    }
}
