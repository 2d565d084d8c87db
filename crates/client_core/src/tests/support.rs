//! In-process stand-in for the banking API, shaped after the real backend.

use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

struct MockAccount {
    pin: String,
    balance: f64,
}

#[derive(Default)]
struct MockBankInner {
    accounts: Mutex<HashMap<String, MockAccount>>,
    hits: Mutex<HashMap<&'static str, usize>>,
    bodies: Mutex<Vec<(&'static str, Value)>>,
    latency: Option<Duration>,
    deposit_limit: Option<f64>,
    transaction_id: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBank {
    inner: Arc<MockBankInner>,
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn detail(status: StatusCode, message: &str) -> Reply {
    reply(status, json!({ "detail": message }))
}

impl MockBank {
    pub(crate) fn builder() -> MockBankBuilder {
        MockBankBuilder::default()
    }

    pub(crate) async fn hits(&self, endpoint: &str) -> usize {
        self.inner
            .hits
            .lock()
            .await
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) async fn total_hits(&self) -> usize {
        self.inner.hits.lock().await.values().sum()
    }

    pub(crate) async fn bodies(&self, endpoint: &str) -> Vec<Value> {
        self.inner
            .bodies
            .lock()
            .await
            .iter()
            .filter(|(name, _)| *name == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub(crate) async fn balance_of(&self, username: &str) -> Option<f64> {
        self.inner
            .accounts
            .lock()
            .await
            .get(username)
            .map(|account| account.balance)
    }

    async fn record(&self, endpoint: &'static str, body: Option<Value>) {
        *self.inner.hits.lock().await.entry(endpoint).or_default() += 1;
        if let Some(body) = body {
            self.inner.bodies.lock().await.push((endpoint, body));
        }
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[derive(Default)]
pub(crate) struct MockBankBuilder {
    accounts: HashMap<String, MockAccount>,
    latency: Option<Duration>,
    deposit_limit: Option<f64>,
    transaction_id: Option<String>,
}

impl MockBankBuilder {
    pub(crate) fn account(mut self, username: &str, pin: &str, balance: f64) -> Self {
        self.accounts.insert(
            username.to_string(),
            MockAccount {
                pin: pin.to_string(),
                balance,
            },
        );
        self
    }

    pub(crate) fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn deposit_limit(mut self, limit: f64) -> Self {
        self.deposit_limit = Some(limit);
        self
    }

    pub(crate) fn transaction_id(mut self, transaction_id: &str) -> Self {
        self.transaction_id = Some(transaction_id.to_string());
        self
    }

    /// Serves the bank on an ephemeral loopback port and returns its base url.
    pub(crate) async fn spawn(self) -> Result<(String, MockBank)> {
        let bank = MockBank {
            inner: Arc::new(MockBankInner {
                accounts: Mutex::new(self.accounts),
                latency: self.latency,
                deposit_limit: self.deposit_limit,
                transaction_id: self.transaction_id,
                ..MockBankInner::default()
            }),
        };
        let app = Router::new()
            .route("/balance/:username", get(handle_balance))
            .route("/deposit", post(handle_deposit))
            .route("/withdraw", post(handle_withdraw))
            .route("/bank-transfer", post(handle_transfer))
            .route("/authenticate", post(handle_authenticate))
            .with_state(bank.clone());
        let base_url = serve(app).await?;
        Ok((base_url, bank))
    }
}

pub(crate) async fn serve(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

/// A loopback url nothing listens on.
pub(crate) async fn unreachable_base_url() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

fn amount_of(body: &Value) -> Option<f64> {
    body.get("amount").and_then(Value::as_f64)
}

fn text_of<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}

async fn handle_balance(State(bank): State<MockBank>, Path(username): Path<String>) -> Reply {
    bank.record("balance", None).await;
    match bank.inner.accounts.lock().await.get(&username) {
        Some(account) => reply(
            StatusCode::OK,
            json!({ "username": username, "balance": account.balance }),
        ),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn handle_deposit(State(bank): State<MockBank>, Json(body): Json<Value>) -> Reply {
    bank.record("deposit", Some(body.clone())).await;
    let Some(amount) = amount_of(&body) else {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "detail": [{ "loc": ["body", "amount"], "msg": "field required" }] }),
        );
    };
    let mut accounts = bank.inner.accounts.lock().await;
    let Some(account) = accounts.get_mut(text_of(&body, "username")) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if amount <= 0.0 {
        return detail(StatusCode::BAD_REQUEST, "Deposit amount must be positive");
    }
    if bank.inner.deposit_limit.is_some_and(|limit| amount > limit) {
        return detail(StatusCode::BAD_REQUEST, "Insufficient funds");
    }
    account.balance += amount;
    reply(
        StatusCode::OK,
        json!({ "message": "Deposit successful", "new_balance": account.balance }),
    )
}

async fn handle_withdraw(State(bank): State<MockBank>, Json(body): Json<Value>) -> Reply {
    bank.record("withdraw", Some(body.clone())).await;
    let amount = amount_of(&body).unwrap_or_default();
    let mut accounts = bank.inner.accounts.lock().await;
    let Some(account) = accounts.get_mut(text_of(&body, "username")) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if amount <= 0.0 {
        return detail(StatusCode::BAD_REQUEST, "Withdrawal amount must be positive");
    }
    if account.balance < amount {
        return detail(StatusCode::BAD_REQUEST, "Insufficient funds for withdrawal.");
    }
    account.balance -= amount;
    reply(
        StatusCode::OK,
        json!({ "message": "Withdrawal successful", "new_balance": account.balance }),
    )
}

async fn handle_transfer(State(bank): State<MockBank>, Json(body): Json<Value>) -> Reply {
    bank.record("bank-transfer", Some(body.clone())).await;
    let amount = amount_of(&body).unwrap_or_default();
    let from = text_of(&body, "from_account").to_string();
    let to = text_of(&body, "to_account").to_string();
    if amount <= 0.0 {
        return detail(StatusCode::BAD_REQUEST, "Transfer amount must be positive");
    }

    let mut accounts = bank.inner.accounts.lock().await;
    if !accounts.contains_key(&from) {
        return detail(StatusCode::NOT_FOUND, "Sender account not found.");
    }
    if !accounts.contains_key(&to) {
        return detail(StatusCode::NOT_FOUND, "Receiver account not found.");
    }
    if from == to {
        return detail(
            StatusCode::BAD_REQUEST,
            "Sender and receiver accounts cannot be the same.",
        );
    }
    let new_balance = match accounts.get_mut(&from) {
        Some(sender) if sender.balance >= amount => {
            sender.balance -= amount;
            sender.balance
        }
        _ => return detail(StatusCode::BAD_REQUEST, "Insufficient funds."),
    };
    if let Some(receiver) = accounts.get_mut(&to) {
        receiver.balance += amount;
    }

    let transaction_id = bank
        .inner
        .transaction_id
        .clone()
        .unwrap_or_else(|| "txn_100001".to_string());
    reply(
        StatusCode::OK,
        json!({
            "message": "Bank transfer successful",
            "transaction_id": transaction_id,
            "new_balance": new_balance,
        }),
    )
}

async fn handle_authenticate(State(bank): State<MockBank>, Json(body): Json<Value>) -> Reply {
    bank.record("authenticate", Some(body.clone())).await;
    let accounts = bank.inner.accounts.lock().await;
    match accounts.get(text_of(&body, "username")) {
        Some(account) if account.pin == text_of(&body, "password") => reply(
            StatusCode::OK,
            json!({ "message": "Authentication successful", "token": "fake-jwt-token" }),
        ),
        _ => detail(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}
