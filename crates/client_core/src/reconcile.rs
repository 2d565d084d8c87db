//! Turns server responses into view state.
//!
//! Balances shown by a page only ever come from the server: a success
//! replaces the [`BalanceView`] wholesale and a failure leaves it alone. The
//! client never adds or subtracts amounts itself.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::domain::TransactionId;

use crate::{
    api::ApiFailure,
    error::{Operation, TransactionError},
    executor::SubmissionState,
    validation::PositiveAmount,
};

/// Copy used when the server gives no usable explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCopy {
    pub unknown_rejection: &'static str,
    pub transport: &'static str,
}

pub const TRANSACTION_FAILURE_COPY: FailureCopy = FailureCopy {
    unknown_rejection: "An unknown error occurred.",
    transport: "Failed to connect to the server. Please try again later.",
};

pub const BALANCE_FAILURE_COPY: FailureCopy = FailureCopy {
    unknown_rejection: "Failed to fetch balance.",
    transport: "An error occurred while fetching balance.",
};

pub fn classify_failure(failure: ApiFailure, copy: &FailureCopy) -> TransactionError {
    match failure {
        ApiFailure::Rejected { status, detail } => TransactionError::ServerRejection {
            status,
            message: detail.unwrap_or_else(|| copy.unknown_rejection.to_string()),
        },
        ApiFailure::Transport(reason) => TransactionError::TransportFailure {
            message: copy.transport.to_string(),
            reason,
        },
    }
}

/// Last balance the server reported to this page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceView {
    pub amount: Option<Decimal>,
}

impl BalanceView {
    pub fn formatted(&self) -> Option<String> {
        self.amount.map(format_currency)
    }
}

/// A settled submission's success payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub operation: Operation,
    pub message: String,
    pub new_balance: Decimal,
    pub transaction_id: Option<TransactionId>,
}

impl TransactionReceipt {
    pub fn funds(operation: Operation, amount: &PositiveAmount, new_balance: Decimal) -> Self {
        Self {
            operation,
            message: format!("{} of ${amount} was successful.", operation.noun()),
            new_balance,
            transaction_id: None,
        }
    }

    pub fn transfer(transaction_id: TransactionId, new_balance: Decimal) -> Self {
        Self {
            operation: Operation::Transfer,
            message: format!("Success! Transaction ID: {transaction_id}"),
            new_balance,
            transaction_id: Some(transaction_id),
        }
    }
}

pub type TransactionOutcome = Result<TransactionReceipt, TransactionError>;

/// Anything carrying a server-authoritative balance.
pub trait AuthoritativeBalance {
    fn authoritative_balance(&self) -> Decimal;
}

impl AuthoritativeBalance for TransactionReceipt {
    fn authoritative_balance(&self) -> Decimal {
        self.new_balance
    }
}

impl AuthoritativeBalance for Decimal {
    fn authoritative_balance(&self) -> Decimal {
        *self
    }
}

pub fn reconcile<T: AuthoritativeBalance>(
    outcome: &Result<T, TransactionError>,
    prior: &BalanceView,
) -> BalanceView {
    match outcome {
        Ok(value) => BalanceView {
            amount: Some(value.authoritative_balance()),
        },
        Err(_) => *prior,
    }
}

/// Banner shown above a form. Success and error are mutually exclusive, and
/// only a success carries a new balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success {
        message: String,
        new_balance: Decimal,
    },
    Error(TransactionError),
}

impl Notice {
    pub fn from_state(state: &SubmissionState<TransactionReceipt>) -> Option<Self> {
        match state {
            SubmissionState::Succeeded(receipt) => Some(Notice::Success {
                message: receipt.message.clone(),
                new_balance: receipt.new_balance,
            }),
            SubmissionState::Failed(err) => Some(Notice::Error(err.clone())),
            SubmissionState::Idle | SubmissionState::Submitting { .. } => None,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Notice::Success { message, .. } => message.clone(),
            Notice::Error(err) => err.to_string(),
        }
    }

    pub fn new_balance_text(&self) -> Option<String> {
        match self {
            Notice::Success { new_balance, .. } => Some(format_currency(*new_balance)),
            Notice::Error(_) => None,
        }
    }
}

/// `$1,234.50` style: two decimals (half away from zero), comma grouping.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Whole-dollar amounts below this convert to `f64` without losing a digit.
const EXACT_F64_LIMIT: u64 = 1 << 53;

fn group_thousands(whole: &str) -> String {
    static GROUPED: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = GROUPED.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .map(|f| f.precision(Precision::Decimals(0)))
            .ok()
    });
    match (whole.parse::<u64>(), formatter) {
        (Ok(dollars), Some(formatter)) if dollars < EXACT_F64_LIMIT => {
            formatter.fmt_string(dollars as f64)
        }
        _ => group_digits(whole),
    }
}

fn group_digits(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
