use std::sync::Arc;

use shared::{
    domain::{AccountName, Route},
    protocol::BankTransferRequest,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::BankApi,
    error::{Operation, TransactionError},
    executor::{Executor, SubmitDisposition},
    pages::{funds::log_outcome, Activation},
    reconcile::{
        classify_failure, reconcile, BalanceView, Notice, TransactionOutcome, TransactionReceipt,
        TRANSACTION_FAILURE_COPY,
    },
    session::SessionContext,
    validation::{validate_amount, validate_recipient},
};

/// Sends funds from the logged-in account to another one. Self-transfers
/// are left for the server to refuse.
pub struct TransferPage {
    from_account: AccountName,
    api: Arc<dyn BankApi>,
    session: SessionContext,
    form: Mutex<TransferForm>,
}

#[derive(Default)]
struct TransferForm {
    recipient: String,
    amount: String,
    executor: Executor<TransactionReceipt>,
    balance: BalanceView,
}

impl TransferForm {
    fn edited(&mut self) {
        if !self.recipient.is_empty() || !self.amount.is_empty() {
            self.executor.dismiss();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferView {
    pub from_account: AccountName,
    pub recipient_input: String,
    pub amount_input: String,
    pub submitting: bool,
    pub submit_label: &'static str,
    pub notice: Option<Notice>,
    pub balance: BalanceView,
}

impl TransferPage {
    pub fn open(session: SessionContext, api: Arc<dyn BankApi>) -> Activation<Self> {
        let Some(current) = session.require_session() else {
            return Activation::Redirecting;
        };
        Activation::Ready(Self {
            from_account: AccountName::from(current.username),
            api,
            session,
            form: Mutex::new(TransferForm::default()),
        })
    }

    pub async fn set_recipient(&self, raw: impl Into<String>) {
        let mut form = self.form.lock().await;
        form.recipient = raw.into();
        form.edited();
    }

    pub async fn set_amount(&self, raw: impl Into<String>) {
        let mut form = self.form.lock().await;
        form.amount = raw.into();
        form.edited();
    }

    pub async fn submit(&self) -> SubmitDisposition {
        let (ticket, request) = {
            let mut form = self.form.lock().await;
            if form.executor.is_submitting() {
                debug!(operation = "transfer", "submit ignored; request outstanding");
                return SubmitDisposition::Ignored;
            }
            let validated = validate_amount(&form.amount, Operation::Transfer).and_then(
                |amount| validate_recipient(&form.recipient).map(|to| (to, amount)),
            );
            let (to_account, amount) = match validated {
                Ok(valid) => valid,
                Err(err) => {
                    form.executor.reject(TransactionError::from(err));
                    return SubmitDisposition::Rejected;
                }
            };
            let Some(ticket) = form.executor.begin() else {
                return SubmitDisposition::Ignored;
            };
            let request = BankTransferRequest {
                from_account: self.from_account.clone(),
                to_account,
                amount: amount.value(),
            };
            (ticket, request)
        };

        info!(
            operation = "transfer",
            from = %request.from_account,
            to = %request.to_account,
            amount = %request.amount,
            "submitting"
        );
        let outcome: TransactionOutcome = self
            .api
            .transfer(&request)
            .await
            .map(|body| TransactionReceipt::transfer(body.transaction_id, body.new_balance))
            .map_err(|failure| classify_failure(failure, &TRANSACTION_FAILURE_COPY));
        log_outcome(Operation::Transfer, &outcome);

        let mut form = self.form.lock().await;
        form.balance = reconcile(&outcome, &form.balance);
        if outcome.is_ok() {
            form.recipient.clear();
            form.amount.clear();
        }
        if let Err(err) = form.executor.settle(ticket, outcome) {
            warn!(operation = "transfer", "dropping outcome: {err}");
        }
        SubmitDisposition::Settled
    }

    pub async fn view(&self) -> TransferView {
        let form = self.form.lock().await;
        let submitting = form.executor.is_submitting();
        TransferView {
            from_account: self.from_account.clone(),
            recipient_input: form.recipient.clone(),
            amount_input: form.amount.clone(),
            submitting,
            submit_label: if submitting {
                "Processing..."
            } else {
                "Initiate Transfer"
            },
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
