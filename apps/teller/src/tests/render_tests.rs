use super::*;
use client_core::{
    error::{Operation, TransactionError, ValidationError},
    BalanceView,
};
use rust_decimal::Decimal;
use shared::domain::Username;

fn funds_view(notice: Option<Notice>) -> FundsView {
    FundsView {
        operation: Operation::Deposit,
        account: Username::new("alice"),
        amount_input: String::new(),
        submitting: false,
        submit_label: "Deposit Funds",
        notice,
        balance: BalanceView::default(),
    }
}

#[test]
fn success_notice_lists_message_and_new_balance() {
    let view = funds_view(Some(Notice::Success {
        message: "Deposit of $50 was successful.".into(),
        new_balance: Decimal::new(1_234_505, 2),
    }));
    assert_eq!(
        funds(&view),
        "Deposit of $50 was successful.\nNew Balance: $12,345.05"
    );
}

#[test]
fn error_notice_is_prefixed() {
    let view = funds_view(Some(Notice::Error(TransactionError::Validation(
        ValidationError::NonPositiveAmount {
            operation: Operation::Deposit,
        },
    ))));
    assert_eq!(funds(&view), "Error: Deposit amount must be positive.");
}

#[test]
fn balance_error_hides_the_amount() {
    let view = BalancePageView {
        account: Username::new("alice"),
        loading: false,
        balance: BalanceView {
            amount: Some(Decimal::new(100, 0)),
        },
        error: Some(TransactionError::ServerRejection {
            status: 404,
            message: "User not found".into(),
        }),
    };
    assert_eq!(balance(&view), "Error: User not found");

    let ok = BalancePageView { error: None, ..view };
    assert_eq!(balance(&ok), "Account: alice\nCurrent Balance: $100.00");
}
