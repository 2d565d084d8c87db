//! HTTP access to the banking API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::Username,
    error::ErrorBody,
    protocol::{
        AuthenticateRequest, AuthenticateResponse, BalanceResponse, BankTransferRequest,
        BankTransferResponse, DepositRequest, NewBalanceResponse, WithdrawRequest,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Raw failure of one API exchange, before it is classified for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("server rejected request with status {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("transport failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait BankApi: Send + Sync {
    async fn fetch_balance(&self, username: &Username) -> Result<BalanceResponse, ApiFailure>;
    async fn deposit(&self, request: &DepositRequest) -> Result<NewBalanceResponse, ApiFailure>;
    async fn withdraw(&self, request: &WithdrawRequest)
        -> Result<NewBalanceResponse, ApiFailure>;
    async fn transfer(
        &self,
        request: &BankTransferRequest,
    ) -> Result<BankTransferResponse, ApiFailure>;
    async fn authenticate(
        &self,
        request: &AuthenticateRequest,
    ) -> Result<AuthenticateResponse, ApiFailure>;
}

pub struct HttpBankClient {
    http: Client,
    base_url: Url,
}

impl HttpBankClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid API base url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base url '{base_url}' cannot carry a path"));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiFailure>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_failure)?;
        decode_response(response).await
    }
}

fn transport_failure(err: reqwest::Error) -> ApiFailure {
    ApiFailure::Transport(err.to_string())
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|err| ApiFailure::Transport(format!("malformed response body: {err}")));
    }

    let detail = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message()),
        Err(err) => {
            warn!(status = status.as_u16(), "failed to read error body: {err}");
            None
        }
    };
    Err(ApiFailure::Rejected {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl BankApi for HttpBankClient {
    async fn fetch_balance(&self, username: &Username) -> Result<BalanceResponse, ApiFailure> {
        let url = self.endpoint(&["balance", username.as_str()]);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(transport_failure)?;
        decode_response(response).await
    }

    async fn deposit(&self, request: &DepositRequest) -> Result<NewBalanceResponse, ApiFailure> {
        self.post_json(&["deposit"], request).await
    }

    async fn withdraw(
        &self,
        request: &WithdrawRequest,
    ) -> Result<NewBalanceResponse, ApiFailure> {
        self.post_json(&["withdraw"], request).await
    }

    async fn transfer(
        &self,
        request: &BankTransferRequest,
    ) -> Result<BankTransferResponse, ApiFailure> {
        self.post_json(&["bank-transfer"], request).await
    }

    async fn authenticate(
        &self,
        request: &AuthenticateRequest,
    ) -> Result<AuthenticateResponse, ApiFailure> {
        self.post_json(&["authenticate"], request).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
