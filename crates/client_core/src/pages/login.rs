use std::sync::Arc;

use shared::{domain::Username, protocol::AuthenticateRequest};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    api::BankApi,
    error::TransactionError,
    executor::{Executor, SubmitDisposition},
    reconcile::{classify_failure, TRANSACTION_FAILURE_COPY},
    session::SessionContext,
    validation::validate_credentials,
};

/// Exchanges username and PIN for a stored session. Not session-guarded.
pub struct LoginPage {
    api: Arc<dyn BankApi>,
    session: SessionContext,
    form: Mutex<LoginForm>,
}

#[derive(Default)]
struct LoginForm {
    username: String,
    pin: String,
    executor: Executor<Username>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView {
    pub username_input: String,
    pub submitting: bool,
    pub logged_in_as: Option<Username>,
    pub error: Option<TransactionError>,
}

impl LoginPage {
    pub fn open(session: SessionContext, api: Arc<dyn BankApi>) -> Self {
        Self {
            api,
            session,
            form: Mutex::new(LoginForm::default()),
        }
    }

    pub async fn set_credentials(&self, username: impl Into<String>, pin: impl Into<String>) {
        let mut form = self.form.lock().await;
        form.username = username.into();
        form.pin = pin.into();
        form.executor.dismiss();
    }

    pub async fn submit(&self) -> SubmitDisposition {
        let (ticket, request) = {
            let mut form = self.form.lock().await;
            if form.executor.is_submitting() {
                return SubmitDisposition::Ignored;
            }
            let (username, password) = match validate_credentials(&form.username, &form.pin) {
                Ok(credentials) => credentials,
                Err(err) => {
                    form.executor.reject(err.into());
                    return SubmitDisposition::Rejected;
                }
            };
            let Some(ticket) = form.executor.begin() else {
                return SubmitDisposition::Ignored;
            };
            (ticket, AuthenticateRequest { username, password })
        };

        info!(username = %request.username, "authenticating");
        let outcome = match self.api.authenticate(&request).await {
            Ok(_) => match self.session.establish_session(request.username.clone()) {
                Ok(session) => Ok(session.username),
                Err(err) => Err(TransactionError::TransportFailure {
                    message: "Could not save your session. Please try again.".to_string(),
                    reason: err.to_string(),
                }),
            },
            Err(failure) => Err(classify_failure(failure, &TRANSACTION_FAILURE_COPY)),
        };
        if let Err(err) = &outcome {
            warn!(username = %request.username, "login failed: {err}");
        }

        let mut form = self.form.lock().await;
        form.pin.clear();
        if let Err(err) = form.executor.settle(ticket, outcome) {
            warn!("dropping login outcome: {err}");
        }
        SubmitDisposition::Settled
    }

    pub async fn view(&self) -> LoginView {
        let form = self.form.lock().await;
        LoginView {
            username_input: form.username.clone(),
            submitting: form.executor.is_submitting(),
            logged_in_as: form.executor.succeeded().cloned(),
            error: form.executor.error().cloned(),
        }
    }
}
