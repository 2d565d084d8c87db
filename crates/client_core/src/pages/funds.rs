use std::sync::Arc;

use shared::{
    domain::{Route, Username},
    protocol::{DepositRequest, WithdrawRequest},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::BankApi,
    error::{Operation, TransactionError},
    executor::{Executor, SubmitDisposition},
    pages::Activation,
    reconcile::{
        classify_failure, reconcile, BalanceView, Notice, TransactionOutcome, TransactionReceipt,
        TRANSACTION_FAILURE_COPY,
    },
    session::SessionContext,
    validation::validate_amount,
};

/// Single-amount form against the caller's own account: deposit or withdraw.
pub struct FundsPage {
    operation: Operation,
    account: Username,
    api: Arc<dyn BankApi>,
    session: SessionContext,
    form: Mutex<FundsForm>,
}

#[derive(Default)]
struct FundsForm {
    amount: String,
    executor: Executor<TransactionReceipt>,
    balance: BalanceView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundsView {
    pub operation: Operation,
    pub account: Username,
    pub amount_input: String,
    pub submitting: bool,
    pub submit_label: &'static str,
    pub notice: Option<Notice>,
    pub balance: BalanceView,
}

impl FundsPage {
    pub fn deposit(session: SessionContext, api: Arc<dyn BankApi>) -> Activation<Self> {
        Self::open(Operation::Deposit, session, api)
    }

    pub fn withdraw(session: SessionContext, api: Arc<dyn BankApi>) -> Activation<Self> {
        Self::open(Operation::Withdraw, session, api)
    }

    fn open(
        operation: Operation,
        session: SessionContext,
        api: Arc<dyn BankApi>,
    ) -> Activation<Self> {
        let Some(current) = session.require_session() else {
            return Activation::Redirecting;
        };
        Activation::Ready(Self {
            operation,
            account: current.username,
            api,
            session,
            form: Mutex::new(FundsForm::default()),
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub async fn set_amount(&self, raw: impl Into<String>) {
        let mut form = self.form.lock().await;
        form.amount = raw.into();
        if !form.amount.is_empty() {
            form.executor.dismiss();
        }
    }

    pub async fn submit(&self) -> SubmitDisposition {
        let (ticket, amount) = {
            let mut form = self.form.lock().await;
            if form.executor.is_submitting() {
                debug!(operation = self.operation.as_str(), "submit ignored; request outstanding");
                return SubmitDisposition::Ignored;
            }
            let amount = match validate_amount(&form.amount, self.operation) {
                Ok(amount) => amount,
                Err(err) => {
                    form.executor.reject(err.into());
                    return SubmitDisposition::Rejected;
                }
            };
            let Some(ticket) = form.executor.begin() else {
                return SubmitDisposition::Ignored;
            };
            (ticket, amount)
        };

        info!(
            operation = self.operation.as_str(),
            username = %self.account,
            %amount,
            "submitting"
        );
        let response = match self.operation {
            Operation::Withdraw => {
                self.api
                    .withdraw(&WithdrawRequest {
                        username: self.account.clone(),
                        amount: amount.value(),
                    })
                    .await
            }
            _ => {
                self.api
                    .deposit(&DepositRequest {
                        username: self.account.clone(),
                        amount: amount.value(),
                    })
                    .await
            }
        };
        let outcome: TransactionOutcome = response
            .map(|body| TransactionReceipt::funds(self.operation, &amount, body.new_balance))
            .map_err(|failure| classify_failure(failure, &TRANSACTION_FAILURE_COPY));
        log_outcome(self.operation, &outcome);

        let mut form = self.form.lock().await;
        form.balance = reconcile(&outcome, &form.balance);
        if outcome.is_ok() {
            form.amount.clear();
        }
        if let Err(err) = form.executor.settle(ticket, outcome) {
            warn!(operation = self.operation.as_str(), "dropping outcome: {err}");
        }
        SubmitDisposition::Settled
    }

    pub async fn view(&self) -> FundsView {
        let form = self.form.lock().await;
        let submitting = form.executor.is_submitting();
        FundsView {
            operation: self.operation,
            account: self.account.clone(),
            amount_input: form.amount.clone(),
            submitting,
            submit_label: submit_label(self.operation, submitting),
            notice: Notice::from_state(form.executor.state()),
            balance: form.balance,
        }
    }

    pub fn back_to_dashboard(&self) {
        self.session.navigate(Route::Dashboard);
    }

    pub fn logout(&self) {
        self.session.clear_session();
    }
}

fn submit_label(operation: Operation, submitting: bool) -> &'static str {
    match (operation, submitting) {
        (Operation::Withdraw, false) => "Withdraw Funds",
        (Operation::Withdraw, true) => "Withdrawing...",
        (_, false) => "Deposit Funds",
        (_, true) => "Depositing...",
    }
}

pub(crate) fn log_outcome(operation: Operation, outcome: &TransactionOutcome) {
    match outcome {
        Ok(receipt) => info!(
            operation = operation.as_str(),
            new_balance = %receipt.new_balance,
            "transaction succeeded"
        ),
        Err(TransactionError::TransportFailure { reason, .. }) => warn!(
            operation = operation.as_str(),
            "transport failure; server-side effect unknown: {reason}"
        ),
        Err(err) => warn!(operation = operation.as_str(), "transaction rejected: {err}"),
    }
}
