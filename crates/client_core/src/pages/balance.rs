use std::sync::Arc;

use rust_decimal::Decimal;
use shared::domain::{Route, Username};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    api::BankApi,
    error::TransactionError,
    executor::{Executor, SubmissionState, SubmitDisposition},
    pages::Activation,
    reconcile::{classify_failure, reconcile, BalanceView, BALANCE_FAILURE_COPY},
    session::SessionContext,
};

/// Read-only view of the logged-in account's balance, fetched on mount.
pub struct BalancePage {
    account: Username,
    api: Arc<dyn BankApi>,
    session: SessionContext,
    state: Mutex<BalanceState>,
}

#[derive(Default)]
struct BalanceState {
    executor: Executor<Decimal>,
    balance: BalanceView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePageView {
    pub account: Username,
    pub loading: bool,
    pub balance: BalanceView,
    pub error: Option<TransactionError>,
}

impl BalancePageView {
    /// Formatted balance, only when there is nothing else to show instead.
    pub fn balance_text(&self) -> Option<String> {
        if self.loading || self.error.is_some() {
            return None;
        }
        self.balance.formatted()
    }
}

impl BalancePage {
    /// Activates the page and performs the initial fetch.
    pub async fn mount(session: SessionContext, api: Arc<dyn BankApi>) -> Activation<Self> {
        let Some(current) = session.require_session() else {
            return Activation::Redirecting;
        };
        let page = Self {
            account: current.username,
            api,
            session,
            state: Mutex::new(BalanceState::default()),
        };
        page.refresh().await;
        Activation::Ready(page)
    }

    pub async fn refresh(&self) -> SubmitDisposition {
        let Some(ticket) = self.state.lock().await.executor.begin() else {
            return SubmitDisposition::Ignored;
        };

        info!(username = %self.account, "fetching balance");
        let outcome = self
            .api
            .fetch_balance(&self.account)
            .await
            .map(|body| body.balance)
            .map_err(|failure| classify_failure(failure, &BALANCE_FAILURE_COPY));
        if let Err(err) = &outcome {
            warn!(username = %self.account, "balance fetch failed: {err}");
        }

        let mut state = self.state.lock().await;
        state.balance = reconcile(&outcome, &state.balance);
        if let Err(err) = state.executor.settle(ticket, outcome) {
            warn!("dropping balance outcome: {err}");
        }
        SubmitDisposition::Settled
    }

    pub async fn view(&self) -> BalancePageView {
        let state = self.state.lock().await;
        BalancePageView {
            account: self.account.clone(),
            loading: matches!(
                state.executor.state(),
                SubmissionState::Idle | SubmissionState::Submitting { .. }
            ),
            balance: state.balance,
            error: state.executor.error().cloned(),
        }
    }

    pub fn back_to_dashboard(&self) {
        self.session.navigate(Route::Dashboard);
    }

    pub fn logout(&self) {
        self.session.clear_session();
    }
}
